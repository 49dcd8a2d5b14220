use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::retrieval::chunker::DEFAULT_CHUNK_SIZE;
use crate::retrieval::embedder::DEFAULT_FASTEMBED_MODEL;

/// Which embedding backend the pipeline is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Local sentence-transformer model run through fastembed.
    FastEmbed {
        model: String,
        cache_dir: Option<PathBuf>,
    },
    /// OpenAI-compatible `/embeddings` endpoint.
    Http {
        api_url: String,
        api_key: Option<String>,
        model: String,
    },
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a value is malformed or an `http` backend lacks its URL/model.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub chunk_size: NonZeroUsize,
    pub top_k: NonZeroUsize,
    pub line_targets: usize,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_dim: usize,
    pub embedding_timeout: Duration,
    pub extra_skills: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (the environment, in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let embedding_backend = match lookup("EMBEDDING_BACKEND")
            .unwrap_or_else(|| "fastembed".to_string())
            .to_lowercase()
            .as_str()
        {
            "fastembed" => EmbeddingBackend::FastEmbed {
                model: lookup("EMBEDDING_MODEL")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FASTEMBED_MODEL.to_string()),
                cache_dir: lookup("EMBEDDING_CACHE_DIR")
                    .filter(|v| !v.trim().is_empty())
                    .map(PathBuf::from),
            },
            "http" => EmbeddingBackend::Http {
                api_url: require(&lookup, "EMBEDDING_API_URL")?,
                api_key: lookup("EMBEDDING_API_KEY"),
                model: require(&lookup, "EMBEDDING_MODEL")?,
            },
            other => bail!("EMBEDDING_BACKEND must be 'fastembed' or 'http', got '{other}'"),
        };

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080_u16)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            chunk_size: non_zero_or(&lookup, "CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            top_k: non_zero_or(&lookup, "TOP_K", 3)?,
            line_targets: parse_or(&lookup, "LINE_TARGETS", 3_usize)?,
            embedding_backend,
            embedding_dim: parse_or(&lookup, "EMBEDDING_DIM", 384_usize)?,
            embedding_timeout: Duration::from_secs(parse_or(
                &lookup,
                "EMBEDDING_TIMEOUT_SECS",
                60_u64,
            )?),
            extra_skills: lookup("EXTRA_SKILLS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn non_zero_or<F>(lookup: &F, key: &str, default: usize) -> Result<NonZeroUsize>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    NonZeroUsize::new(value).with_context(|| format!("{key} must be greater than zero"))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
