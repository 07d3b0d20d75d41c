//! Candidate fusion: union the two top-K lists, min-max normalize each score
//! type over the candidate set, and rank by the weighted sum.
//!
//! Normalization is over candidates, not the corpus, so fused scores compare
//! within the surfaced result set and cost `O(vector_k + bm25_k)`.
//!
//! A candidate retrieved by one method only gets `0` for the other method's
//! normalized score. It still ranks; it just earns nothing from the modality
//! that did not retrieve it.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use ragfuse_core::types::{Candidate, ChunkId, FusionResult, ScoredCandidate, SearchHit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CandidateCounts {
    pub vector: usize,
    pub bm25: usize,
    pub merged: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fusion {
    /// Truncated to `top_k`, ranks starting at 1.
    pub ranking: Vec<FusionResult>,
    /// Every merged candidate in fused order.
    pub scored: Vec<ScoredCandidate>,
    pub counts: CandidateCounts,
}

/// Union in discovery order: the vector list first, then BM25-only chunks.
pub fn collect_candidates(vector: &[SearchHit], bm25: &[SearchHit]) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = Vec::with_capacity(vector.len() + bm25.len());
    let mut pos: HashMap<ChunkId, usize> = HashMap::new();
    for hit in vector {
        if pos.contains_key(&hit.chunk_id) {
            continue;
        }
        pos.insert(hit.chunk_id, out.len());
        out.push(Candidate {
            chunk_id: hit.chunk_id,
            vector_score_raw: Some(hit.score),
            bm25_score_raw: None,
            from_vector: true,
            from_bm25: false,
        });
    }
    for hit in bm25 {
        match pos.get(&hit.chunk_id) {
            Some(&i) => {
                let c = &mut out[i];
                if !c.from_bm25 {
                    c.bm25_score_raw = Some(hit.score);
                    c.from_bm25 = true;
                }
            }
            None => {
                pos.insert(hit.chunk_id, out.len());
                out.push(Candidate {
                    chunk_id: hit.chunk_id,
                    vector_score_raw: None,
                    bm25_score_raw: Some(hit.score),
                    from_vector: false,
                    from_bm25: true,
                });
            }
        }
    }
    out
}

/// Min-max normalize the present values; absent values map to `0`.
///
/// When the present values span no range (`max == min`, one value, or none)
/// every output is exactly `0`.
pub fn min_max_normalize(values: &[Option<f64>]) -> Vec<f64> {
    let present = values.iter().flatten().copied();
    let (lo, hi) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = hi - lo;
    if !(span > 0.0 && span.is_finite()) {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| v.map_or(0.0, |raw| (raw - lo) / span)).collect()
}

pub fn fusion_score(alpha: f64, vector_norm: f64, bm25_norm: f64) -> f64 {
    alpha * vector_norm + (1.0 - alpha) * bm25_norm
}

/// Fusion score descending; on ties, candidates found by both methods
/// first, then chunk id ascending.
pub fn fused_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.fusion_score
        .total_cmp(&a.fusion_score)
        .then_with(|| b.candidate.from_both().cmp(&a.candidate.from_both()))
        .then_with(|| a.candidate.chunk_id.cmp(&b.candidate.chunk_id))
}

pub fn fuse(vector: &[SearchHit], bm25: &[SearchHit], alpha: f64, top_k: usize) -> Fusion {
    let candidates = collect_candidates(vector, bm25);
    let vector_raw: Vec<Option<f64>> = candidates.iter().map(|c| c.vector_score_raw).collect();
    let bm25_raw: Vec<Option<f64>> = candidates.iter().map(|c| c.bm25_score_raw).collect();
    let vector_norm = min_max_normalize(&vector_raw);
    let bm25_norm = min_max_normalize(&bm25_raw);

    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .zip(vector_norm.iter().zip(&bm25_norm))
        .map(|(c, (&v, &b))| ScoredCandidate {
            candidate: *c,
            vector_score_norm: v,
            bm25_score_norm: b,
            fusion_score: fusion_score(alpha, v, b),
        })
        .collect();
    scored.sort_by(fused_order);

    let ranking = scored
        .iter()
        .take(top_k)
        .enumerate()
        .map(|(i, s)| FusionResult {
            chunk_id: s.candidate.chunk_id,
            rank: i + 1,
            vector_score_norm: s.vector_score_norm,
            bm25_score_norm: s.bm25_score_norm,
            fusion_score: s.fusion_score,
        })
        .collect();

    let counts = CandidateCounts { vector: vector.len(), bm25: bm25.len(), merged: candidates.len() };
    Fusion { ranking, scored, counts }
}
