//! Retrieval Pipeline — chunk → embed → index → search for one document and query.
//!
//! The pipeline owns no index. Each `answer_context` call builds a fresh one and
//! drops it on return; callers asking several questions about the same document
//! should use `index_document` once and search that index directly.

use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::errors::MatchError;
use crate::extraction::rules::StructuredResumeFields;
use crate::matching::skill_set::SkillSet;
use crate::retrieval::chunker::{Chunk, ChunkPolicy};
use crate::retrieval::embedder::Embedder;
use crate::retrieval::index::VectorIndex;

/// A résumé line selected for rewriting, with its nearest neighbouring lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineContext {
    pub line: Chunk,
    pub related: Vec<Chunk>,
}

#[derive(Clone)]
pub struct RetrievalPipeline {
    embedder: Arc<dyn Embedder>,
    chunk_size: NonZeroUsize,
}

impl RetrievalPipeline {
    pub fn new(embedder: Arc<dyn Embedder>, chunk_size: NonZeroUsize) -> Self {
        Self {
            embedder,
            chunk_size,
        }
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    /// Chunks `document_text` with the window policy and indexes the chunks.
    pub async fn index_document(&self, document_text: &str) -> Result<VectorIndex, MatchError> {
        self.index_with(ChunkPolicy::window(self.chunk_size), document_text)
            .await
    }

    async fn index_with(
        &self,
        policy: ChunkPolicy,
        document_text: &str,
    ) -> Result<VectorIndex, MatchError> {
        let chunks = policy.chunk(document_text);
        if chunks.is_empty() {
            return Err(MatchError::EmptyDocument);
        }
        debug!("Chunked document into {} chunks ({:?})", chunks.len(), policy);
        VectorIndex::build(chunks, self.embedder.as_ref()).await
    }

    /// The `top_k` chunks of `document_text` nearest to `query`. Rebuilds the index every call.
    pub async fn answer_context(
        &self,
        document_text: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<Chunk>, MatchError> {
        let index = self.index_document(document_text).await?;
        let chunks = index.search(query, top_k, self.embedder.as_ref()).await?;
        info!(
            "Retrieved {} of {} chunks for query",
            chunks.len(),
            index.len()
        );
        Ok(chunks)
    }

    /// Splits `resume_text` into lines, indexes them once, and pairs each of the
    /// first `targets` lines with its `top_k` nearest lines.
    ///
    /// A line is its own nearest neighbour, so `related` normally starts with it.
    pub async fn line_targets(
        &self,
        resume_text: &str,
        targets: usize,
        top_k: usize,
    ) -> Result<Vec<LineContext>, MatchError> {
        let index = self.index_with(ChunkPolicy::Lines, resume_text).await?;

        let mut contexts = Vec::new();
        for line in index.chunks().iter().take(targets) {
            let related = index
                .search(&line.text, top_k, self.embedder.as_ref())
                .await?;
            contexts.push(LineContext {
                line: line.clone(),
                related,
            });
        }
        Ok(contexts)
    }
}

/// Renders extracted résumé fields and JD skills into the document that career
/// questions are answered against.
///
/// Present fields become `key: value` lines in a fixed order; the JD skills follow
/// a `Job Description:` header.
pub fn compose_document(fields: &StructuredResumeFields, jd_skills: &SkillSet) -> String {
    let skills = fields.skills.iter().collect::<Vec<_>>().join(", ");
    let entries: [(&str, Option<&str>); 7] = [
        ("email", fields.email.as_deref()),
        ("phone", fields.phone.as_deref()),
        ("linkedin", fields.linkedin.as_deref()),
        ("github", fields.github.as_deref()),
        ("skills", Some(skills.as_str()).filter(|s| !s.is_empty())),
        ("education", fields.education.as_deref()),
        ("experience", fields.experience.as_deref()),
    ];

    let resume_block = entries
        .iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("{key}: {v}"))
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{resume_block}\n\nJob Description:\n{}",
        jd_skills.to_vec().join(", ")
    )
}
