//! Axum route handlers for the Extraction API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extraction::jd_skills::extract_jd_skills;
use crate::extraction::pdf::pdf_to_text;
use crate::extraction::rules::{extract, StructuredResumeFields};
use crate::matching::skill_set::SkillSet;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub raw_text: String,
    pub hyperlinks: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub fields: StructuredResumeFields,
}

#[derive(Debug, Serialize)]
pub struct ExtractPdfResponse {
    pub raw_text: String,
    pub fields: StructuredResumeFields,
}

#[derive(Debug, Deserialize)]
pub struct JdSkillsRequest {
    pub jd_text: String,
}

#[derive(Debug, Serialize)]
pub struct JdSkillsResponse {
    pub skills: SkillSet,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/extract
///
/// Runs the field extractor over raw résumé text. Unmatched fields come back as null.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    let fields = extract(
        &request.raw_text,
        request.hyperlinks.as_deref(),
        &state.vocabulary,
    );
    Ok(Json(ExtractResponse { fields }))
}

/// POST /api/v1/resumes/extract-pdf
///
/// Multipart upload: one `file` part holding the PDF, any number of `hyperlinks`
/// parts (one URL each, or newline-separated) taken from the document's link annotations.
pub async fn handle_extract_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractPdfResponse>, AppError> {
    let mut pdf_bytes = None;
    let mut hyperlinks: Vec<String> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                pdf_bytes = Some(bytes);
            }
            Some("hyperlinks") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read hyperlinks: {e}")))?;
                hyperlinks.extend(
                    text.lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(String::from),
                );
            }
            _ => {}
        }
    }

    let pdf_bytes =
        pdf_bytes.ok_or_else(|| AppError::Validation("Missing 'file' part".to_string()))?;

    // PDF parsing is CPU-bound; keep it off the async workers
    let raw_text = tokio::task::spawn_blocking(move || pdf_to_text(&pdf_bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::UnprocessableEntity(format!("{e:#}")))?;

    let links = (!hyperlinks.is_empty()).then_some(hyperlinks.as_slice());
    let fields = extract(&raw_text, links, &state.vocabulary);

    Ok(Json(ExtractPdfResponse { raw_text, fields }))
}

/// POST /api/v1/jobs/skills
///
/// Returns the vocabulary skills a job description asks for.
pub async fn handle_jd_skills(
    State(state): State<AppState>,
    Json(request): Json<JdSkillsRequest>,
) -> Result<Json<JdSkillsResponse>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }

    let skills = extract_jd_skills(&request.jd_text, &state.vocabulary, state.tagger());
    Ok(Json(JdSkillsResponse { skills }))
}
