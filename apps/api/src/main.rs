mod config;
mod errors;
mod extraction;
mod matching;
mod retrieval;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, EmbeddingBackend};
use crate::extraction::vocabulary::SkillVocabulary;
use crate::matching::scorer::SkillOverlapScorer;
use crate::retrieval::embedder::{Embedder, FastEmbedEmbedder, HttpEmbedder};
use crate::retrieval::pipeline::RetrievalPipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-match v{}", env!("CARGO_PKG_VERSION"));

    // Initialize embedder (caller-owned; handed to the pipeline, never global)
    let embedder = build_embedder(&config).await?;
    info!(
        "Embedder initialized (model: {}, dim: {})",
        embedder.model_id(),
        embedder.dimension()
    );
    let pipeline = RetrievalPipeline::new(embedder, config.chunk_size);

    // Initialize skill vocabulary (built-in catalogue + EXTRA_SKILLS)
    let vocabulary = Arc::new(SkillVocabulary::with_extra(&config.extra_skills)?);
    info!("Skill vocabulary loaded: {} entries", vocabulary.len());

    // Build app state
    let state = AppState {
        config: config.clone(),
        pipeline,
        vocabulary,
        tagger: None,
        fit_scorer: Arc::new(SkillOverlapScorer),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the embedding backend selected by `EMBEDDING_BACKEND`.
/// Loading a local model may download it, so that runs on the blocking pool.
async fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match &config.embedding_backend {
        EmbeddingBackend::FastEmbed { model, cache_dir } => {
            let (model, cache_dir) = (model.clone(), cache_dir.clone());
            let embedder =
                tokio::task::spawn_blocking(move || FastEmbedEmbedder::new(&model, cache_dir))
                    .await??;
            Arc::new(embedder)
        }
        EmbeddingBackend::Http {
            api_url,
            api_key,
            model,
        } => Arc::new(HttpEmbedder::new(
            api_url,
            api_key.clone(),
            model.clone(),
            config.embedding_dim,
            config.embedding_timeout,
        )?),
    };
    Ok(embedder)
}
