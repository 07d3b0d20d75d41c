use ragfuse_core::config::RetrievalConfig;

/// BM25 free parameters. `k1` saturates term frequency, `b` scales length
/// normalization (0 = none, 1 = full).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl From<&RetrievalConfig> for Bm25Params {
    fn from(c: &RetrievalConfig) -> Self {
        Self { k1: c.bm25_k1, b: c.bm25_b }
    }
}
