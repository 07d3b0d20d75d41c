use std::collections::HashSet;

use serde::Serialize;

use ragfuse_core::types::{ChunkId, ExtractId};

use crate::trace::DebugTrace;

/// A citation for the answer step: one per parent extract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceLink {
    pub score: f64,
    pub chunk_id: ChunkId,
    pub extract_id: ExtractId,
    pub url: String,
    pub from_vector: bool,
    pub from_bm25: bool,
    pub vector_score_raw: Option<f64>,
    pub bm25_score_raw: Option<f64>,
    pub vector_score_norm: f64,
    pub bm25_score_norm: f64,
}

/// Walk the fused ranking, keep the best-ranked chunk of each extract, stop
/// after `max` links.
pub fn source_links(trace: &DebugTrace, max: Option<usize>) -> Vec<SourceLink> {
    let mut seen: HashSet<ExtractId> = HashSet::new();
    trace
        .ranked_chunks
        .iter()
        .filter(|r| seen.insert(r.extract_id))
        .take(max.unwrap_or(usize::MAX))
        .map(|r| SourceLink {
            score: r.score,
            chunk_id: r.chunk_id,
            extract_id: r.extract_id,
            url: r.url.clone(),
            from_vector: r.from_vector,
            from_bm25: r.from_bm25,
            vector_score_raw: r.vector_score_raw,
            bm25_score_raw: r.bm25_score_raw,
            vector_score_norm: r.vector_score_norm,
            bm25_score_norm: r.bm25_score_norm,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::fuse;
    use ragfuse_core::config::RetrievalConfig;
    use ragfuse_core::store::ChunkStore;
    use ragfuse_core::types::{Chunk, SearchHit, SourceKind};

    #[test]
    fn one_link_per_extract_in_rank_order() {
        let store = ChunkStore::new(vec![
            Chunk::new(1, 100, "https://a", "x", vec![1.0]),
            Chunk::new(2, 100, "https://a", "y", vec![1.0]),
            Chunk::new(3, 200, "https://b", "z", vec![1.0]),
        ])
        .expect("store");
        let vector: Vec<SearchHit> = [(1, 0.9), (2, 0.8), (3, 0.1)]
            .iter()
            .map(|&(chunk_id, score)| SearchHit { chunk_id, score, source: SourceKind::Vector })
            .collect();
        let fusion = fuse(&vector, &[], 0.7, 10);
        let trace = DebugTrace::assemble("q", &["q".into()], &RetrievalConfig::default(), &fusion, &store);

        let links = source_links(&trace, None);
        let ids: Vec<i64> = links.iter().map(|l| l.chunk_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(links[1].url, "https://b");

        assert_eq!(source_links(&trace, Some(1)).len(), 1);
    }
}
