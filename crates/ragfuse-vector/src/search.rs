use tracing::instrument;

use ragfuse_core::error::{Error, Result};
use ragfuse_core::ranking::top_k;
use ragfuse_core::types::{SearchHit, SourceKind};

use crate::index::VectorIndex;

pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum()
}

impl VectorIndex {
    /// Score every chunk against each query-variant embedding, keep the best
    /// variant score per chunk, and return the top `k`.
    #[instrument(skip_all, fields(variants = queries.len(), k))]
    pub fn search(&self, queries: &[Vec<f32>], k: usize) -> Result<Vec<SearchHit>> {
        let Some(dim) = self.dim else { return Ok(Vec::new()) };
        for (i, q) in queries.iter().enumerate() {
            if q.len() != dim {
                return Err(Error::DimensionMismatch {
                    context: format!("query variant {}", i),
                    expected: dim,
                    found: q.len(),
                });
            }
        }
        if queries.is_empty() || self.is_empty() {
            return Ok(Vec::new());
        }
        let hits = (0..self.len())
            .map(|i| {
                let row = self.row(i, dim);
                let best = queries
                    .iter()
                    .map(|q| dot(q, row))
                    .fold(f64::NEG_INFINITY, f64::max);
                SearchHit { chunk_id: self.chunk_ids[i], score: best, source: SourceKind::Vector }
            })
            .collect();
        Ok(top_k(hits, k))
    }
}
