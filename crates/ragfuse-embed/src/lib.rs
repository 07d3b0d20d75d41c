//! ragfuse-embed
//!
//! Deterministic feature-hashing embedder. It stands in for the external
//! embedding model in tests, demos and corpora exported without vectors:
//! texts sharing words get positive dot products, identical texts get 1.0.

use anyhow::{anyhow, Result};
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use ragfuse_core::tokenize::tokenize;
use ragfuse_core::traits::Embedder;

pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(anyhow!("embedding dimension must be > 0"));
        }
        Ok(Self { dim })
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in tokenize(text) {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            // top bit picks the sign so unrelated tokens cancel instead of pile up
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        normalize_l2(&mut v);
        v
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Scale `v` to unit length in place. All-zero vectors stay zero.
pub fn normalize_l2(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-12 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

pub fn get_default_embedder(dim: usize) -> Result<Box<dyn Embedder>> {
    tracing::debug!(dim, "using HashEmbedder");
    Ok(Box::new(HashEmbedder::new(dim)?))
}
