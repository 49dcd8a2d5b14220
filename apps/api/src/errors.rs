use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the matching core (chunking, embedding, indexing, scoring).
///
/// "Not found" during field extraction is never an error; absent fields are `None`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Empty input: nothing to chunk or index")]
    EmptyInput,

    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Document produced no chunks")]
    EmptyDocument,

    #[error("Malformed skill set: {0}")]
    MalformedSkillSet(String),

    #[error("Invalid embedding output: {0}")]
    InvalidEmbedding(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid skill vocabulary: {0}")]
    InvalidVocabulary(String),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::ModelUnavailable(msg) => AppError::ModelUnavailable(msg),
            MatchError::InvalidEmbedding(msg) => {
                AppError::Internal(anyhow::anyhow!("embedding backend misbehaved: {msg}"))
            }
            MatchError::InvalidVocabulary(msg) => {
                AppError::Internal(anyhow::anyhow!("skill vocabulary rejected: {msg}"))
            }
            MatchError::InvalidArgument(msg) => AppError::Validation(msg),
            MatchError::EmptyInput | MatchError::EmptyDocument => {
                AppError::UnprocessableEntity(err.to_string())
            }
            MatchError::MalformedSkillSet(_) => AppError::UnprocessableEntity(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Embedding model unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "MODEL_UNAVAILABLE",
                    "The embedding model is currently unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
