//! PDF intake — turns uploaded résumé bytes into the raw text the extractor consumes.

use anyhow::{Context, Result};
use tracing::debug;

/// Extracts the text layer of a PDF and normalises it for field extraction.
pub fn pdf_to_text(bytes: &[u8]) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes).context("failed to read PDF text")?;
    let normalized = normalize_text(&text);
    debug!(
        "Extracted {} chars of text from {} byte PDF",
        normalized.len(),
        bytes.len()
    );
    Ok(normalized)
}

/// Line breaks become spaces, carriage returns are dropped, ends are trimmed.
pub fn normalize_text(text: &str) -> String {
    text.replace('\n', " ").replace('\r', "").trim().to_string()
}

/// Builds a one-page PDF showing `text` in Helvetica, with a correct xref table.
#[cfg(test)]
pub fn single_page_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 712 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    pdf
}
