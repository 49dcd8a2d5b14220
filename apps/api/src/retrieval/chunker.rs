//! Chunker — splits text into bounded segments that are embedded and indexed.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Default token window for document chunking.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// A contiguous slice of the source text, identified by its position in the chunk sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub position: usize,
    pub text: String,
}

/// How a text is cut into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPolicy {
    /// Consecutive, non-overlapping windows of at most `size` whitespace tokens.
    Window { size: NonZeroUsize },
    /// One chunk per non-blank line, trimmed.
    Lines,
}

impl ChunkPolicy {
    pub fn window(size: NonZeroUsize) -> Self {
        ChunkPolicy::Window { size }
    }

    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        match self {
            ChunkPolicy::Window { size } => chunk_words(text, *size),
            ChunkPolicy::Lines => chunk_lines(text),
        }
    }
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        ChunkPolicy::Window {
            size: NonZeroUsize::new(DEFAULT_CHUNK_SIZE).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// Groups whitespace-delimited tokens into windows of at most `chunk_size` tokens.
/// The last window may be shorter. Empty or blank input yields no chunks.
pub fn chunk_words(text: &str, chunk_size: NonZeroUsize) -> Vec<Chunk> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(chunk_size.get())
        .enumerate()
        .map(|(position, window)| Chunk {
            position,
            text: window.join(" "),
        })
        .collect()
}

/// Splits on line breaks, dropping blank lines. Positions count kept lines only.
pub fn chunk_lines(text: &str) -> Vec<Chunk> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(position, line)| Chunk {
            position,
            text: line.to_string(),
        })
        .collect()
}
