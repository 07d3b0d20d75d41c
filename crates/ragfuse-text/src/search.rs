use std::collections::HashSet;

use tracing::{debug, instrument};

use ragfuse_core::ranking::top_k;
use ragfuse_core::types::{SearchHit, SourceKind};

use crate::index::Bm25Index;

impl Bm25Index {
    /// `ln(1 + (N - df + 0.5) / (df + 0.5))`. Defined for unseen terms (`df = 0`).
    pub fn idf(&self, term: &str) -> f64 {
        let n = self.doc_count() as f64;
        let df = self.df(term) as f64;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn tf_component(&self, tf: f64, doc_len: usize) -> f64 {
        let Self { params, .. } = self;
        let avg = if self.avg_len > 0.0 { self.avg_len } else { 1.0 };
        let denom = tf + params.k1 * (1.0 - params.b + params.b * (doc_len as f64 / avg));
        if denom <= 0.0 {
            return 0.0;
        }
        (tf * (params.k1 + 1.0)) / denom
    }

    /// Raw BM25 score of document `doc` for `terms`. Terms are summed once each,
    /// in first-occurrence order.
    pub fn score(&self, doc: usize, terms: &[String]) -> f64 {
        let Some(&doc_len) = self.doc_lens.get(doc) else { return 0.0 };
        dedup(terms)
            .into_iter()
            .map(|term| {
                let tf = self.tf(doc, term);
                if tf == 0 { 0.0 } else { self.idf(term) * self.tf_component(f64::from(tf), doc_len) }
            })
            .sum()
    }

    /// Top `k` chunks sharing at least one term with the query. Chunks with no
    /// overlapping term are never returned.
    #[instrument(skip_all, fields(terms = terms.len(), k))]
    pub fn search(&self, terms: &[String], k: usize) -> Vec<SearchHit> {
        let terms = dedup(terms);
        if terms.is_empty() || self.doc_count() == 0 {
            return Vec::new();
        }
        let mut scores = vec![0.0f64; self.doc_count()];
        let mut matched = vec![false; self.doc_count()];
        for term in terms {
            let Some(postings) = self.postings.get(term) else { continue };
            let idf = self.idf(term);
            for &(doc, tf) in postings {
                scores[doc] += idf * self.tf_component(f64::from(tf), self.doc_lens[doc]);
                matched[doc] = true;
            }
        }
        let hits: Vec<SearchHit> = matched
            .iter()
            .enumerate()
            .filter(|(_, &m)| m)
            .map(|(doc, _)| SearchHit {
                chunk_id: self.chunk_ids[doc],
                score: scores[doc],
                source: SourceKind::Bm25,
            })
            .collect();
        debug!(matched = hits.len(), "bm25 scored");
        top_k(hits, k)
    }
}

fn dedup(terms: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    terms.iter().map(String::as_str).filter(|t| seen.insert(*t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Bm25Params;
    use ragfuse_core::store::ChunkStore;
    use ragfuse_core::tokenize::tokenize;
    use ragfuse_core::types::Chunk;

    fn index(texts: &[&str], params: Bm25Params) -> Bm25Index {
        let chunks = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk::new(i as i64 + 1, 1, "", *t, vec![]))
            .collect();
        Bm25Index::build(&ChunkStore::new(chunks).expect("store"), params)
    }

    #[test]
    fn idf_matches_formula_and_handles_unseen_terms() {
        let idx = index(&["a b", "a c", "d"], Bm25Params::default());
        let expected = (1.0f64 + (3.0 - 2.0 + 0.5) / (2.0 + 0.5)).ln();
        assert!((idx.idf("a") - expected).abs() < 1e-12);
        let unseen = (1.0f64 + 3.5 / 0.5).ln();
        assert!((idx.idf("zzz") - unseen).abs() < 1e-12);
        assert!(idx.idf("zzz").is_finite());
    }

    #[test]
    fn score_matches_hand_computation() {
        // docs: len 3, len 1; avg 2
        let idx = index(&["fire fire wood", "wood"], Bm25Params::default());
        let (k1, b) = (1.5f64, 0.75f64);
        let idf_fire = (1.0f64 + (2.0 - 1.0 + 0.5) / 1.5).ln();
        let idf_wood = (1.0f64 + (2.0 - 2.0 + 0.5) / 2.5).ln();
        let norm = 1.0 - b + b * (3.0 / 2.0);
        let fire = idf_fire * (2.0 * (k1 + 1.0)) / (2.0 + k1 * norm);
        let wood = idf_wood * (1.0 * (k1 + 1.0)) / (1.0 + k1 * norm);
        let got = idx.score(0, &tokenize("fire wood"));
        assert!((got - (fire + wood)).abs() < 1e-12, "got {got}");
    }

    #[test]
    fn params_are_not_hard_wired() {
        let texts = ["fire fire wood", "wood"];
        let terms = tokenize("fire");
        let default = index(&texts, Bm25Params::default()).score(0, &terms);
        let flat = index(&texts, Bm25Params { k1: 1.2, b: 0.0 }).score(0, &terms);
        assert!((default - flat).abs() > 1e-9);
    }

    #[test]
    fn search_excludes_non_matching_and_sorts() {
        let idx = index(&["fire wood", "water well", "fire fire fire", "stone"], Bm25Params::default());
        let hits = idx.search(&tokenize("fire"), 10);
        let ids: Vec<i64> = hits.iter().map(|h| h.chunk_id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(hits[0].score > hits[1].score);
        assert!(hits.iter().all(|h| h.source == SourceKind::Bm25));
    }

    #[test]
    fn search_score_equals_direct_score() {
        let idx = index(&["a b c", "b c d d", "e"], Bm25Params::default());
        let terms = tokenize("b d b");
        for hit in idx.search(&terms, 10) {
            let doc = (hit.chunk_id - 1) as usize;
            assert_eq!(hit.score, idx.score(doc, &terms));
        }
    }

    #[test]
    fn equal_scores_break_by_chunk_id() {
        let idx = index(&["same text", "other", "same text"], Bm25Params::default());
        let ids: Vec<i64> = idx.search(&tokenize("same"), 10).iter().map(|h| h.chunk_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn truncates_to_k_and_handles_empty_inputs() {
        let idx = index(&["x", "x y", "x y z"], Bm25Params::default());
        assert_eq!(idx.search(&tokenize("x"), 2).len(), 2);
        assert!(idx.search(&[], 10).is_empty());
        assert!(idx.search(&tokenize("!!!"), 10).is_empty());
        let empty = index(&[], Bm25Params::default());
        assert!(empty.search(&tokenize("x"), 10).is_empty());
    }
}
