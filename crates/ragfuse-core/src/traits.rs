/// External embedding function. Vectors must be L2-normalized and share
/// `dim()` for a given embedder; the indices rely on it but do not check norms.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Source of extra query variants (paraphrases, synonym rewrites).
///
/// Implementations may return the original query or duplicates; the
/// expander filters them.
pub trait VariantGenerator: Send + Sync {
    fn variants(&self, query: &str) -> anyhow::Result<Vec<String>>;
}
