//! ragfuse-text
//!
//! In-memory BM25 index over a chunk store. See `index` for the corpus
//! statistics built once per snapshot and `search` for scoring and top-K
//! retrieval.

pub mod index;
pub mod params;
pub mod search;

pub use index::Bm25Index;
pub use params::Bm25Params;
