use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, instrument};

use ragfuse_core::config::RetrievalConfig;
use ragfuse_core::error::{Error, Result};
use ragfuse_core::store::ChunkStore;
use ragfuse_core::types::{Chunk, CorpusStats};
use ragfuse_text::{Bm25Index, Bm25Params};
use ragfuse_vector::VectorIndex;

/// Cooperative cancellation for a corpus rebuild. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self { Self::default() }
    pub fn cancel(&self) { self.0.store(true, Ordering::SeqCst); }
    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::SeqCst) }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() { Err(Error::Cancelled) } else { Ok(()) }
    }
}

/// Everything a query reads, built together and never mutated afterwards.
#[derive(Debug)]
pub struct IndexSnapshot {
    store: ChunkStore,
    bm25: Bm25Index,
    vector: VectorIndex,
}

impl IndexSnapshot {
    pub fn build(chunks: Vec<Chunk>, config: &RetrievalConfig, expected_dim: Option<usize>) -> Result<Self> {
        Self::build_cancellable(chunks, config, expected_dim, &CancelFlag::new())
    }

    #[instrument(skip_all, fields(chunks = chunks.len()))]
    pub fn build_cancellable(
        chunks: Vec<Chunk>,
        config: &RetrievalConfig,
        expected_dim: Option<usize>,
        cancel: &CancelFlag,
    ) -> Result<Self> {
        config.validate()?;
        let store = ChunkStore::new(chunks)?;
        cancel.check()?;
        let vector = VectorIndex::build(&store, expected_dim)?;
        cancel.check()?;
        let bm25 = Bm25Index::build(&store, Bm25Params::from(config));
        cancel.check()?;
        info!(chunks = store.len(), dim = ?vector.dim(), "index snapshot built");
        Ok(Self { store, bm25, vector })
    }

    pub fn store(&self) -> &ChunkStore { &self.store }
    pub fn bm25(&self) -> &Bm25Index { &self.bm25 }
    pub fn vector(&self) -> &VectorIndex { &self.vector }
    pub fn stats(&self) -> CorpusStats { self.bm25.stats() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks() -> Vec<Chunk> {
        vec![
            Chunk::new(1, 1, "u", "wood stove", vec![1.0, 0.0]),
            Chunk::new(2, 1, "u", "rain barrel", vec![0.0, 1.0]),
        ]
    }

    #[test]
    fn builds_all_parts() {
        let snap = IndexSnapshot::build(chunks(), &RetrievalConfig::default(), None).expect("build");
        assert_eq!(snap.store().len(), 2);
        assert_eq!(snap.vector().dim(), Some(2));
        assert_eq!(snap.stats().doc_count, 2);
    }

    #[test]
    fn cancelled_build_returns_error() {
        let cancel = CancelFlag::new();
        cancel.clone().cancel();
        let res = IndexSnapshot::build_cancellable(chunks(), &RetrievalConfig::default(), None, &cancel);
        assert!(matches!(res, Err(Error::Cancelled)));
    }

    #[test]
    fn invalid_config_rejected() {
        let config = RetrievalConfig { fusion_alpha: -1.0, ..RetrievalConfig::default() };
        assert!(matches!(IndexSnapshot::build(chunks(), &config, None), Err(Error::InvalidConfig(_))));
    }
}
