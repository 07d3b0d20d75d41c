use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use anyhow::anyhow;
use serde::Serialize;
use tracing::{debug, info, instrument};

use ragfuse_core::config::RetrievalConfig;
use ragfuse_core::error::{Error, Result};
use ragfuse_core::tokenize::unique_terms;
use ragfuse_core::traits::Embedder;
use ragfuse_core::types::{Chunk, FusionResult};

use crate::expand::QueryExpander;
use crate::fusion::fuse;
use crate::snapshot::{CancelFlag, IndexSnapshot};
use crate::trace::DebugTrace;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Retrieval {
    pub ranking: Vec<FusionResult>,
    pub debug: DebugTrace,
}

/// Hybrid vector + BM25 retrieval over the currently published snapshot.
///
/// Queries clone the snapshot `Arc` and never hold the lock while scoring, so
/// a rebuild publishing a new snapshot does not wait for them and they never
/// see a partially built index. Rebuilds are serialized: a rebuild started
/// while another is in flight waits for it and publishes after it.
pub struct HybridEngine {
    config: RetrievalConfig,
    embedder: Arc<dyn Embedder>,
    expander: QueryExpander,
    current: RwLock<Option<Arc<IndexSnapshot>>>,
    rebuild_lock: Mutex<()>,
}

impl HybridEngine {
    pub fn new(config: RetrievalConfig, embedder: Arc<dyn Embedder>, expander: QueryExpander) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, embedder, expander, current: RwLock::new(None), rebuild_lock: Mutex::new(()) })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// The published snapshot, or [`Error::NotReady`] before the first build.
    pub fn snapshot(&self) -> Result<Arc<IndexSnapshot>> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        guard.clone().ok_or(Error::NotReady)
    }

    /// Swap in `snapshot`; returns the one it replaced. Waits for any
    /// in-flight rebuild so it cannot be overwritten by an older build.
    pub fn publish(&self, snapshot: IndexSnapshot) -> Option<Arc<IndexSnapshot>> {
        let _exclusive = self.rebuild_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.swap(snapshot)
    }

    fn swap(&self, snapshot: IndexSnapshot) -> Option<Arc<IndexSnapshot>> {
        let next = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        info!(chunks = next.store().len(), "publishing index snapshot");
        guard.replace(next)
    }

    pub fn rebuild(&self, chunks: Vec<Chunk>) -> Result<()> {
        self.rebuild_cancellable(chunks, &CancelFlag::new())
    }

    /// Build a fresh snapshot off to the side and publish it only if the build
    /// completed. The previous snapshot keeps serving until then.
    pub fn rebuild_cancellable(&self, chunks: Vec<Chunk>, cancel: &CancelFlag) -> Result<()> {
        let _exclusive = self.rebuild_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot =
            IndexSnapshot::build_cancellable(chunks, &self.config, Some(self.embedder.dim()), cancel)?;
        self.swap(snapshot);
        Ok(())
    }

    #[instrument(skip(self), fields(query_len = query.len()))]
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Retrieval> {
        let t0 = Instant::now();
        let snapshot = self.snapshot()?;

        let variants = self.expander.expand(query);
        let embeddings = self.embedder.embed_batch(&variants).map_err(Error::Embedding)?;
        if embeddings.len() != variants.len() {
            return Err(Error::Embedding(anyhow!(
                "embedder returned {} vectors for {} query variants",
                embeddings.len(),
                variants.len()
            )));
        }
        let terms = unique_terms(variants.iter().map(String::as_str));

        let (vector, bm25) = rayon::join(
            || {
                let t = Instant::now();
                let hits = snapshot.vector().search(&embeddings, self.config.vector_candidate_k);
                (hits, t.elapsed())
            },
            || {
                let t = Instant::now();
                let hits = snapshot.bm25().search(&terms, self.config.bm25_candidate_k);
                (hits, t.elapsed())
            },
        );
        let (vector_hits, vector_elapsed) = vector;
        let vector_hits = vector_hits?;
        let (bm25_hits, bm25_elapsed) = bm25;

        let t_fusion = Instant::now();
        let fusion = fuse(&vector_hits, &bm25_hits, self.config.fusion_alpha, top_k);
        let fusion_elapsed = t_fusion.elapsed();

        debug!(
            vector_candidates = fusion.counts.vector,
            bm25_candidates = fusion.counts.bm25,
            merged_candidates = fusion.counts.merged,
            "hybrid candidates"
        );
        debug!(?vector_elapsed, ?bm25_elapsed, ?fusion_elapsed, total = ?t0.elapsed(), "hybrid timing");

        let debug = DebugTrace::assemble(query, &variants, &self.config, &fusion, snapshot.store());
        Ok(Retrieval { ranking: fusion.ranking, debug })
    }
}
