//! Axum route handlers for the Retrieval API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extraction::jd_skills::extract_jd_skills;
use crate::extraction::rules::extract;
use crate::retrieval::chunker::Chunk;
use crate::retrieval::pipeline::{compose_document, LineContext};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ContextRequest {
    pub document_text: String,
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CareerContextRequest {
    pub resume_text: String,
    pub hyperlinks: Option<Vec<String>>,
    pub jd_text: String,
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub chunks: Vec<Chunk>,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct LineTargetsRequest {
    pub resume_text: String,
    pub targets: Option<usize>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LineTargetsResponse {
    pub lines: Vec<LineContext>,
    pub model: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/retrieval/context
///
/// Top-k chunks of an arbitrary document for a free-text question.
pub async fn handle_context(
    State(state): State<AppState>,
    Json(request): Json<ContextRequest>,
) -> Result<Json<ContextResponse>, AppError> {
    if request.query.trim().is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    let top_k = request.top_k.unwrap_or(state.config.top_k.get());
    let chunks = state
        .pipeline
        .answer_context(&request.document_text, &request.query, top_k)
        .await?;

    Ok(Json(ContextResponse {
        chunks,
        model: state.pipeline.embedder().model_id().to_string(),
    }))
}

/// POST /api/v1/retrieval/career-context
///
/// Extracts the résumé and JD, assembles them into one document, and retrieves
/// the chunks that ground an answer to a career question.
pub async fn handle_career_context(
    State(state): State<AppState>,
    Json(request): Json<CareerContextRequest>,
) -> Result<Json<ContextResponse>, AppError> {
    if request.query.trim().is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    let fields = extract(
        &request.resume_text,
        request.hyperlinks.as_deref(),
        &state.vocabulary,
    );
    let jd_skills = extract_jd_skills(&request.jd_text, &state.vocabulary, state.tagger());
    let document = compose_document(&fields, &jd_skills);

    let top_k = request.top_k.unwrap_or(state.config.top_k.get());
    let chunks = state
        .pipeline
        .answer_context(&document, &request.query, top_k)
        .await?;

    Ok(Json(ContextResponse {
        chunks,
        model: state.pipeline.embedder().model_id().to_string(),
    }))
}

/// POST /api/v1/retrieval/line-targets
///
/// The first `targets` résumé lines, each with the lines most related to it.
pub async fn handle_line_targets(
    State(state): State<AppState>,
    Json(request): Json<LineTargetsRequest>,
) -> Result<Json<LineTargetsResponse>, AppError> {
    let targets = request.targets.unwrap_or(state.config.line_targets);
    let top_k = request.top_k.unwrap_or(state.config.top_k.get());

    let lines = state
        .pipeline
        .line_targets(&request.resume_text, targets, top_k)
        .await?;

    Ok(Json(LineTargetsResponse {
        lines,
        model: state.pipeline.embedder().model_id().to_string(),
    }))
}
