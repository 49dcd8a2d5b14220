//! Embedder — maps strings to fixed-dimension vectors.
//!
//! `FastEmbedEmbedder` runs sentence-transformers/all-MiniLM-L6-v2 locally through
//! fastembed; `HttpEmbedder` talks to an OpenAI-compatible `/embeddings` endpoint.
//!
//! Vectors are only comparable within one `model_id()`; never persist them
//! across model upgrades.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::MatchError;

pub const DEFAULT_FASTEMBED_MODEL: &str = "all-MiniLM-L6-v2";
const MINILM_DIMENSION: usize = 384;

/// Embedding contract shared by all backends.
///
/// `embed` returns exactly one vector per input, in input order, each of
/// length `dimension()`. Backends must fail rather than substitute zero vectors.
/// Dropping the returned future abandons the call; in-flight inference is not interrupted.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn model_id(&self) -> &str;

    fn dimension(&self) -> usize;

    async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, MatchError>;
}

/// Checks a backend's output against the contract: one vector per input, each
/// of the configured dimension.
fn validate_batch(
    vectors: Vec<Vec<f32>>,
    expected: usize,
    dimension: usize,
) -> Result<Vec<Vec<f32>>, MatchError> {
    if vectors.len() != expected {
        return Err(MatchError::InvalidEmbedding(format!(
            "{} embeddings for {} inputs",
            vectors.len(),
            expected
        )));
    }
    if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dimension) {
        return Err(MatchError::InvalidEmbedding(format!(
            "embedding {i} has dimension {}, expected {dimension}",
            v.len()
        )));
    }
    Ok(vectors)
}

fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FastEmbedEmbedder
// ────────────────────────────────────────────────────────────────────────────

/// Resolves a configured model name to a fastembed model.
pub fn parse_fastembed_model(name: &str) -> Result<EmbeddingModel, MatchError> {
    match name.trim().to_lowercase().as_str() {
        "" | "minilm" | "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
            Ok(EmbeddingModel::AllMiniLML6V2)
        }
        other => Err(MatchError::InvalidArgument(format!(
            "unsupported embedding model '{other}', supported: {DEFAULT_FASTEMBED_MODEL}"
        ))),
    }
}

/// Local ONNX sentence embedder. Inference is CPU-bound and runs on the
/// blocking pool; the session is shared behind a mutex.
#[derive(Clone)]
pub struct FastEmbedEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    model_id: String,
    dimension: usize,
}

impl FastEmbedEmbedder {
    /// Loads (and on first use downloads) the model. Blocking.
    pub fn new(model_name: &str, cache_dir: Option<PathBuf>) -> Result<Self, MatchError> {
        let model = parse_fastembed_model(model_name)?;
        let model_id = model.to_string();

        let mut init = InitOptions::new(model).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            init = init.with_cache_dir(dir);
        }
        let embedding = TextEmbedding::try_new(init).map_err(|e| {
            warn!("Failed to initialize fastembed model {model_id}: {e}");
            MatchError::ModelUnavailable(e.to_string())
        })?;
        info!("Loaded fastembed model {model_id}");

        Ok(Self {
            model: Arc::new(Mutex::new(embedding)),
            model_id,
            dimension: MINILM_DIMENSION,
        })
    }
}

#[async_trait]
impl Embedder for FastEmbedEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, MatchError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = inputs.iter().map(|s| s.to_string()).collect();
        let model = Arc::clone(&self.model);
        let mut vectors = tokio::task::spawn_blocking(move || {
            let mut model = model.lock().map_err(|_| {
                MatchError::ModelUnavailable("embedding model lock poisoned".to_string())
            })?;
            model
                .embed(&texts, None)
                .map_err(|e| MatchError::ModelUnavailable(e.to_string()))
        })
        .await
        .map_err(|e| MatchError::ModelUnavailable(format!("embedding task failed: {e}")))??;

        for vector in vectors.iter_mut() {
            l2_normalize(vector);
        }
        debug!("Embedded {} inputs with model {}", inputs.len(), self.model_id);

        validate_batch(vectors, inputs.len(), self.dimension)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HashingEmbedder (deterministic stub for tests)
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
#[cfg(test)]
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Feature-hashing bag-of-words embedder.
///
/// Each lowercased token is hashed (FNV-1a) into one of `dimension` buckets with a
/// sign bit; the result is L2-normalised. Text with no tokens maps to the zero vector.
/// Purely lexical: texts are close only when they share tokens.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

#[cfg(test)]
impl HashingEmbedder {
    pub const MODEL_ID: &'static str = "hashing-v1";

    pub fn new(dimension: usize) -> Result<Self, MatchError> {
        if dimension == 0 {
            return Err(MatchError::InvalidArgument(
                "embedding dimension must be > 0".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        l2_normalize(&mut vector);
        vector
    }
}

#[cfg(test)]
fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
#[async_trait]
impl Embedder for HashingEmbedder {
    fn model_id(&self) -> &str {
        Self::MODEL_ID
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, MatchError> {
        Ok(inputs.iter().map(|text| self.embed_one(text)).collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HttpEmbedder
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible embeddings endpoint.
/// Does not retry; transient failures surface as `ModelUnavailable`.
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
}

impl HttpEmbedder {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: String,
        dimension: usize,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
        anyhow::ensure!(dimension > 0, "embedding dimension must be > 0");
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build embedding HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            dimension,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, MatchError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.trim());
        }

        let response = builder.send().await.map_err(|e| {
            warn!("Embedding request to {} failed: {e}", self.endpoint);
            MatchError::ModelUnavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Embedding API returned {}: {}", status, body);
            return Err(MatchError::ModelUnavailable(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| MatchError::ModelUnavailable(format!("unreadable response: {e}")))?;

        let vectors = order_by_index(parsed.data, inputs.len(), self.dimension)?;
        debug!(
            "Embedded {} inputs with model {}",
            inputs.len(),
            self.model
        );
        Ok(vectors)
    }
}

/// Puts response entries back in input order. The indices must be exactly `0..expected`.
fn order_by_index(
    mut data: Vec<EmbeddingData>,
    expected: usize,
    dimension: usize,
) -> Result<Vec<Vec<f32>>, MatchError> {
    data.sort_by_key(|entry| entry.index);
    if let Some((position, entry)) = data
        .iter()
        .enumerate()
        .find(|(position, entry)| entry.index != *position)
    {
        return Err(MatchError::InvalidEmbedding(format!(
            "response index {} at position {position}; indices must be 0..{expected}",
            entry.index
        )));
    }
    validate_batch(
        data.into_iter().map(|d| d.embedding).collect(),
        expected,
        dimension,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    #[tokio::test]
    async fn test_hashing_embedder_is_deterministic() {
        let embedder = HashingEmbedder::new(64).unwrap();
        let first = embedder.embed(&["Python and SQL"]).await.unwrap();
        let second = embedder.embed(&["Python and SQL"]).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_hashing_embedder_preserves_order_and_dimension() {
        let embedder = HashingEmbedder::new(32).unwrap();
        let inputs = ["rust", "kubernetes", "rust"];
        let vectors = embedder.embed(&inputs).await.unwrap();
        assert_eq!(vectors.len(), 3);
        assert!(vectors.iter().all(|v| v.len() == 32));
        assert_eq!(vectors[0], vectors[2]);
    }

    #[tokio::test]
    async fn test_hashing_embedder_is_case_insensitive_and_normalised() {
        let embedder = HashingEmbedder::new(128).unwrap();
        let vectors = embedder.embed(&["Machine Learning", "machine learning"]).await.unwrap();
        assert_eq!(vectors[0], vectors[1]);
        let norm: f32 = vectors[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
    }

    #[tokio::test]
    async fn test_shared_tokens_are_closer() {
        let embedder = HashingEmbedder::new(384).unwrap();
        let vectors = embedder
            .embed(&[
                "python sql data analysis",
                "python sql pipelines",
                "watercolour painting classes",
            ])
            .await
            .unwrap();
        let near = squared_distance(&vectors[0], &vectors[1]);
        let far = squared_distance(&vectors[0], &vectors[2]);
        assert!(near < far, "near={near} far={far}");
    }

    #[tokio::test]
    async fn test_blank_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16).unwrap();
        let vectors = embedder.embed(&["   "]).await.unwrap();
        assert!(vectors[0].iter().all(|v| *v == 0.0));
    }

    fn entry(index: usize, embedding: Vec<f32>) -> EmbeddingData {
        EmbeddingData { index, embedding }
    }

    #[test]
    fn test_response_reordered_by_index() {
        let data = vec![entry(1, vec![1.0, 1.0]), entry(0, vec![0.0, 0.0])];
        let vectors = order_by_index(data, 2, 2).unwrap();
        assert_eq!(vectors, vec![vec![0.0, 0.0], vec![1.0, 1.0]]);
    }

    #[test]
    fn test_duplicate_response_index_rejected() {
        let data = vec![
            entry(0, vec![0.0]),
            entry(0, vec![1.0]),
            entry(2, vec![2.0]),
        ];
        let err = order_by_index(data, 3, 1).unwrap_err();
        assert!(matches!(err, MatchError::InvalidEmbedding(_)), "got {err:?}");
    }

    #[test]
    fn test_short_response_rejected() {
        let data = vec![entry(0, vec![0.0])];
        let err = order_by_index(data, 2, 1).unwrap_err();
        assert!(matches!(err, MatchError::InvalidEmbedding(_)), "got {err:?}");
    }

    #[test]
    fn test_response_with_wrong_dimension_rejected() {
        let data = vec![entry(0, vec![0.0; 384]), entry(1, vec![0.0; 768])];
        let err = order_by_index(data, 2, 384).unwrap_err();
        assert_eq!(
            err,
            MatchError::InvalidEmbedding("embedding 1 has dimension 768, expected 384".to_string())
        );
    }

    #[test]
    fn test_fastembed_model_names() {
        for name in ["all-MiniLM-L6-v2", "minilm", "sentence-transformers/all-MiniLM-L6-v2", ""] {
            assert!(
                matches!(parse_fastembed_model(name), Ok(EmbeddingModel::AllMiniLML6V2)),
                "{name}"
            );
        }
        assert!(matches!(
            parse_fastembed_model("bert-large"),
            Err(MatchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_fastembed_rejects_unknown_model_before_loading() {
        assert!(matches!(
            FastEmbedEmbedder::new("bert-large", None),
            Err(MatchError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    #[ignore = "downloads the all-MiniLM-L6-v2 model"]
    async fn test_fastembed_places_synonyms_closer_than_unrelated_text() {
        let embedder = FastEmbedEmbedder::new(DEFAULT_FASTEMBED_MODEL, None).unwrap();
        let vectors = embedder
            .embed(&["software developer", "programmer", "watercolour painting"])
            .await
            .unwrap();
        assert!(vectors.iter().all(|v| v.len() == embedder.dimension()));
        let near = squared_distance(&vectors[0], &vectors[1]);
        let far = squared_distance(&vectors[0], &vectors[2]);
        assert!(near < far, "near={near} far={far}");
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            HashingEmbedder::new(0),
            Err(MatchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_http_embedder_requires_model() {
        let result = HttpEmbedder::new(
            "http://localhost:9999/v1",
            None,
            "  ".to_string(),
            384,
            Duration::from_secs(1),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_http_embedder_unreachable_is_model_unavailable() {
        let embedder = HttpEmbedder::new(
            "http://127.0.0.1:9/v1",
            None,
            "all-MiniLM-L6-v2".to_string(),
            384,
            Duration::from_millis(500),
        )
        .unwrap();
        let err = embedder.embed(&["python"]).await.unwrap_err();
        assert!(matches!(err, MatchError::ModelUnavailable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_http_embedder_empty_batch_skips_request() {
        let embedder = HttpEmbedder::new(
            "http://127.0.0.1:9/v1",
            None,
            "all-MiniLM-L6-v2".to_string(),
            384,
            Duration::from_millis(500),
        )
        .unwrap();
        assert!(embedder.embed(&[]).await.unwrap().is_empty());
    }
}
