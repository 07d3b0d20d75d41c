use tracing::{debug, instrument};

use ragfuse_core::error::{Error, Result};
use ragfuse_core::store::ChunkStore;
use ragfuse_core::types::ChunkId;

/// Row-major matrix of chunk embeddings; row `i` belongs to `store.chunks()[i]`.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    pub(crate) chunk_ids: Vec<ChunkId>,
    pub(crate) matrix: Vec<f32>,
    pub(crate) dim: Option<usize>,
}

impl VectorIndex {
    /// Fails with [`Error::DimensionMismatch`] if chunks disagree on
    /// dimensionality, or if `expected_dim` is given and the corpus differs.
    #[instrument(skip_all, fields(chunks = store.len()))]
    pub fn build(store: &ChunkStore, expected_dim: Option<usize>) -> Result<Self> {
        let mut dim = expected_dim;
        let mut chunk_ids = Vec::with_capacity(store.len());
        let mut matrix = Vec::new();
        for chunk in store.chunks() {
            let found = chunk.embedding.len();
            match dim {
                None => dim = Some(found),
                Some(expected) if expected != found => {
                    return Err(Error::DimensionMismatch {
                        context: format!("embedding of chunk {}", chunk.id),
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
            if found == 0 {
                return Err(Error::InvalidConfig(format!("chunk {} has an empty embedding", chunk.id)));
            }
            chunk_ids.push(chunk.id);
            matrix.extend_from_slice(&chunk.embedding);
        }
        debug!(rows = chunk_ids.len(), dim = ?dim, "vector index built");
        Ok(Self { chunk_ids, matrix, dim })
    }

    /// Dimensionality fixed at build time; `None` for an empty corpus built
    /// without an expected dimension.
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.chunk_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_ids.is_empty()
    }

    pub(crate) fn row(&self, i: usize, dim: usize) -> &[f32] {
        &self.matrix[i * dim..(i + 1) * dim]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragfuse_core::types::Chunk;

    fn store(vectors: Vec<Vec<f32>>) -> ChunkStore {
        let chunks = vectors
            .into_iter()
            .enumerate()
            .map(|(i, v)| Chunk::new(i as i64, 0, "", "t", v))
            .collect();
        ChunkStore::new(chunks).expect("store")
    }

    #[test]
    fn mixed_dimensions_fail() {
        let err = VectorIndex::build(&store(vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]]), None);
        assert!(matches!(err, Err(Error::DimensionMismatch { expected: 2, found: 3, .. })));
    }

    #[test]
    fn expected_dim_is_enforced() {
        let err = VectorIndex::build(&store(vec![vec![1.0, 0.0]]), Some(4));
        assert!(matches!(err, Err(Error::DimensionMismatch { expected: 4, found: 2, .. })));
    }

    #[test]
    fn empty_corpus_builds() {
        let idx = VectorIndex::build(&ChunkStore::default(), None).expect("build");
        assert!(idx.is_empty());
        assert_eq!(idx.dim(), None);
    }
}
