pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::matching::handlers as matching;
use crate::retrieval::handlers as retrieval;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction API
        .route("/api/v1/resumes/extract", post(extraction::handle_extract))
        .route(
            "/api/v1/resumes/extract-pdf",
            post(extraction::handle_extract_pdf),
        )
        .route("/api/v1/jobs/skills", post(extraction::handle_jd_skills))
        // Matching API
        .route("/api/v1/match/score", post(matching::handle_score))
        .route("/api/v1/match/compare", post(matching::handle_compare))
        .route("/api/v1/match/analyze", post(matching::handle_analyze))
        // Retrieval API
        .route("/api/v1/retrieval/context", post(retrieval::handle_context))
        .route(
            "/api/v1/retrieval/career-context",
            post(retrieval::handle_career_context),
        )
        .route(
            "/api/v1/retrieval/line-targets",
            post(retrieval::handle_line_targets),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::extraction::pdf::single_page_pdf;
    use crate::extraction::vocabulary::SkillVocabulary;
    use crate::matching::scorer::SkillOverlapScorer;
    use crate::retrieval::embedder::HashingEmbedder;
    use crate::retrieval::pipeline::RetrievalPipeline;

    fn test_state() -> AppState {
        let config = Config::from_lookup(|_| None).unwrap();
        AppState {
            pipeline: RetrievalPipeline::new(
                Arc::new(HashingEmbedder::new(config.embedding_dim).unwrap()),
                NonZeroUsize::new(4).unwrap(),
            ),
            config,
            vocabulary: Arc::new(SkillVocabulary::with_extra(&[]).unwrap()),
            tagger: None,
            fit_scorer: Arc::new(SkillOverlapScorer),
        }
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = build_router(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    const BOUNDARY: &str = "resume-match-test-boundary";

    /// Encodes `(name, bytes)` parts as a `multipart/form-data` body.
    fn multipart_body(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, data) in parts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_multipart(parts: &[(&str, &[u8])]) -> (StatusCode, Value) {
        let response = build_router(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/resumes/extract-pdf")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(multipart_body(parts)))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_extract_pdf_with_hyperlink_parts() {
        let pdf = single_page_pdf("jane@example.com Python SQL");
        let (status, body) = post_multipart(&[
            ("hyperlinks", b"https://linkedin.com/in/jane\n\n  \n".as_slice()),
            ("file", pdf.as_slice()),
            ("hyperlinks", b"https://github.com/jane".as_slice()),
        ])
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(body["raw_text"].as_str().unwrap().contains("Python"));
        assert_eq!(body["fields"]["linkedin"], "https://linkedin.com/in/jane");
        assert_eq!(body["fields"]["github"], "https://github.com/jane");
        assert_eq!(body["fields"]["skills"], json!(["python", "sql"]));
    }

    #[tokio::test]
    async fn test_extract_pdf_blank_hyperlinks_leave_links_null() {
        let pdf = single_page_pdf("Python developer");
        let (status, body) = post_multipart(&[
            ("file", pdf.as_slice()),
            ("hyperlinks", b"\n   \n".as_slice()),
        ])
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["fields"]["linkedin"], Value::Null);
        assert_eq!(body["fields"]["github"], Value::Null);
    }

    #[tokio::test]
    async fn test_extract_pdf_requires_file_part() {
        let (status, body) =
            post_multipart(&[("hyperlinks", b"https://github.com/jane".as_slice())]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_extract_pdf_unreadable_file_is_422() {
        let (status, body) = post_multipart(&[("file", b"not a pdf at all".as_slice())]).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }

    #[tokio::test]
    async fn test_health() {
        let response = build_router(test_state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["embedding_model"], "hashing-v1");
        assert_eq!(body["vocabulary_size"], 23);
    }

    #[tokio::test]
    async fn test_extract_endpoint() {
        let (status, body) = post_json(
            "/api/v1/resumes/extract",
            json!({
                "raw_text": "jane@example.com Python developer",
                "hyperlinks": ["https://github.com/jane"]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fields"]["email"], "jane@example.com");
        assert_eq!(body["fields"]["github"], "https://github.com/jane");
        assert_eq!(body["fields"]["linkedin"], Value::Null);
        assert_eq!(body["fields"]["skills"], json!(["python"]));
    }

    #[tokio::test]
    async fn test_score_endpoint() {
        let (status, body) = post_json(
            "/api/v1/match/score",
            json!({
                "resume_skills": ["python", "sql"],
                "jd_skills": ["python", "sql", "aws"]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 66);
        assert_eq!(body["fit_level"], "Medium");
        assert_eq!(body["missing"], json!(["aws"]));
        assert_eq!(body["scorer_backend"], "skill_overlap");
    }

    #[tokio::test]
    async fn test_score_rejects_non_string_skills() {
        let (status, body) = post_json(
            "/api/v1/match/score",
            json!({ "resume_skills": ["python", 3], "jd_skills": [] }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }

    #[tokio::test]
    async fn test_compare_endpoint() {
        let (status, body) = post_json(
            "/api/v1/match/compare",
            json!({ "resume_skills": ["Python"], "jd_skills": ["python", "git"] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched_skills"], json!(["python"]));
        assert_eq!(
            body["suggestions"],
            json!(["You may consider learning or adding projects using: git"])
        );
    }

    #[tokio::test]
    async fn test_analyze_endpoint() {
        let (status, body) = post_json(
            "/api/v1/match/analyze",
            json!({
                "resume_text": "Experience: five years of Python and SQL analytics at Acme. Skills: Git",
                "jd_text": "We need Python, SQL, Git and AWS."
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"]["score"], 75);
        assert_eq!(body["score"]["fit_level"], "Medium");
        assert_eq!(body["comparison"]["missing_skills"], json!(["aws"]));
    }

    #[tokio::test]
    async fn test_jd_skills_requires_text() {
        let (status, _) = post_json("/api/v1/jobs/skills", json!({ "jd_text": "  " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_context_endpoint() {
        let (status, body) = post_json(
            "/api/v1/retrieval/context",
            json!({
                "document_text": "kubernetes helm terraform clusters python pandas sql warehouse",
                "query": "sql warehouse",
                "top_k": 1
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chunks"][0]["text"], "python pandas sql warehouse");
        assert_eq!(body["chunks"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_context_empty_document_is_422() {
        let (status, _) = post_json(
            "/api/v1/retrieval/context",
            json!({ "document_text": "   ", "query": "python" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_context_zero_top_k_is_400() {
        let (status, _) = post_json(
            "/api/v1/retrieval/context",
            json!({ "document_text": "python", "query": "python", "top_k": 0 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_career_context_endpoint() {
        let (status, body) = post_json(
            "/api/v1/retrieval/career-context",
            json!({
                "resume_text": "jane@example.com Python SQL",
                "jd_text": "AWS and Python",
                "query": "which skills does the job need",
                "top_k": 5
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["chunks"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_line_targets_endpoint() {
        let (status, body) = post_json(
            "/api/v1/retrieval/line-targets",
            json!({
                "resume_text": "Shipped payments API\nLed AWS migration\nMentored interns\nWrote docs",
                "targets": 2,
                "top_k": 1
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let lines = body["lines"].as_array().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["line"]["text"], "Led AWS migration");
        assert_eq!(lines[1]["related"][0]["text"], "Led AWS migration");
    }
}
