//! ragfuse-hybrid
//!
//! The retrieval pipeline: query expansion, parallel vector and BM25
//! candidate retrieval, score fusion and the debug trace, served from an
//! atomically swapped index snapshot.

pub mod engine;
pub mod expand;
pub mod fusion;
pub mod snapshot;
pub mod sources;
pub mod trace;

pub use engine::{HybridEngine, Retrieval};
pub use expand::{QueryExpander, SynonymExpander};
pub use snapshot::{CancelFlag, IndexSnapshot};
pub use trace::DebugTrace;
