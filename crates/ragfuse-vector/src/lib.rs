//! ragfuse-vector
//!
//! Flat in-memory vector index. Embeddings are assumed L2-normalized
//! upstream, so the dot product stands in for cosine similarity; norms are
//! not re-verified here.

pub mod index;
pub mod search;

pub use index::VectorIndex;
