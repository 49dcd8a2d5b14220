// Semantic retrieval: chunking, embedding, exact nearest-neighbour search.
// Indexes are built per request and owned by the caller; nothing is cached or persisted.

pub mod chunker;
pub mod embedder;
pub mod handlers;
pub mod index;
pub mod pipeline;
