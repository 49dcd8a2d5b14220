//! Vector Index — exact (brute-force) nearest-neighbour search over chunk embeddings.
//!
//! Row `i` of the flat vector buffer is the embedding of `chunks[i]`. An index is
//! built once per document, owned by its caller, and never updated.

use serde::Serialize;
use tracing::{debug, info};

use crate::errors::MatchError;
use crate::retrieval::chunker::Chunk;
use crate::retrieval::embedder::Embedder;

/// A search result: the chunk and its squared Euclidean distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub chunk: Chunk,
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    vectors: Vec<f32>,
    chunks: Vec<Chunk>,
}

impl VectorIndex {
    /// Embeds every chunk in one batch and stores the vectors row-major.
    ///
    /// Fails with `EmptyInput` for no chunks. Any embedding failure fails the
    /// whole build; no partial index is ever returned.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self, MatchError> {
        if chunks.is_empty() {
            return Err(MatchError::EmptyInput);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = embedder.embed(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(MatchError::InvalidEmbedding(format!(
                "{} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 {
            return Err(MatchError::InvalidEmbedding(
                "zero-length embedding".to_string(),
            ));
        }

        let mut vectors = Vec::with_capacity(dimension * embeddings.len());
        for (row, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != dimension {
                return Err(MatchError::InvalidEmbedding(format!(
                    "row {row} has dimension {}, expected {dimension}",
                    embedding.len()
                )));
            }
            vectors.extend_from_slice(embedding);
        }

        info!(
            "Built vector index: {} chunks, dim {}, model {}",
            chunks.len(),
            dimension,
            embedder.model_id()
        );

        Ok(Self {
            dimension,
            vectors,
            chunks,
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Returns up to `top_k` chunks closest to `query`, nearest first.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<Chunk>, MatchError> {
        Ok(self
            .search_with_distances(query, top_k, embedder)
            .await?
            .into_iter()
            .map(|hit| hit.chunk)
            .collect())
    }

    /// Like `search`, but keeps the distance of each hit.
    ///
    /// Length is `min(top_k, len())`. Distances are non-decreasing; equal
    /// distances keep chunk order.
    pub async fn search_with_distances(
        &self,
        query: &str,
        top_k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<SearchHit>, MatchError> {
        if top_k == 0 {
            return Err(MatchError::InvalidArgument(
                "top_k must be greater than zero".to_string(),
            ));
        }

        let mut embedded = embedder.embed(&[query]).await?;
        let query_vector = match embedded.pop() {
            Some(v) if embedded.is_empty() => v,
            _ => {
                return Err(MatchError::InvalidEmbedding(
                    "expected exactly one query embedding".to_string(),
                ))
            }
        };

        let ranked = self.rank(&query_vector)?;
        debug!(
            "Vector search over {} rows, returning {}",
            self.len(),
            top_k.min(self.len())
        );

        Ok(ranked
            .into_iter()
            .take(top_k)
            .map(|(row, distance)| SearchHit {
                chunk: self.chunks[row].clone(),
                distance,
            })
            .collect())
    }

    /// Every row with its distance to `query`, ascending by (distance, row).
    fn rank(&self, query: &[f32]) -> Result<Vec<(usize, f32)>, MatchError> {
        if query.len() != self.dimension {
            return Err(MatchError::InvalidEmbedding(format!(
                "query has dimension {}, index has {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .map(|row| squared_euclidean(row, query))
            .enumerate()
            .collect();
        // stable sort: ties keep the lower row first
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(scored)
    }
}

pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
