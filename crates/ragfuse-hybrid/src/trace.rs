//! Debug trace: score provenance for every surfaced chunk.
//!
//! Field names are a wire contract for the debug display and for stored
//! message debug payloads. Renaming any of them is a breaking change.

use serde::Serialize;

use ragfuse_core::config::RetrievalConfig;
use ragfuse_core::store::ChunkStore;
use ragfuse_core::types::{ChunkId, ExtractId, ScoredCandidate};

use crate::fusion::{CandidateCounts, Fusion};

pub const PREVIEW_CHARS: usize = 220;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChunk {
    pub rank: usize,
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
    pub chunk_preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceEntry {
    pub chunk_id: ChunkId,
    pub extract_id: ExtractId,
    pub score: f64,
    pub from_vector: bool,
    pub from_bm25: bool,
    pub vector_score_raw: Option<f64>,
    pub bm25_score_raw: Option<f64>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugTrace {
    pub query: String,
    pub query_variants: Vec<String>,
    pub config: RetrievalConfig,
    pub candidate_counts: CandidateCounts,
    pub ranked_chunks: Vec<RankedChunk>,
    pub sources: Vec<SourceEntry>,
}

impl DebugTrace {
    pub fn assemble(
        query: &str,
        query_variants: &[String],
        config: &RetrievalConfig,
        fusion: &Fusion,
        store: &ChunkStore,
    ) -> Self {
        let locate = |id: ChunkId| {
            store
                .get(id)
                .map(|c| (c.extract_id, c.url.clone(), c.preview(PREVIEW_CHARS)))
                .unwrap_or_default()
        };

        let ranked_chunks = fusion
            .scored
            .iter()
            .zip(&fusion.ranking)
            .map(|(s, r)| {
                let (extract_id, url, chunk_preview) = locate(r.chunk_id);
                RankedChunk {
                    rank: r.rank,
                    score: r.fusion_score,
                    chunk_id: r.chunk_id,
                    extract_id,
                    url,
                    from_vector: s.candidate.from_vector,
                    from_bm25: s.candidate.from_bm25,
                    vector_score_raw: s.candidate.vector_score_raw,
                    bm25_score_raw: s.candidate.bm25_score_raw,
                    vector_score_norm: r.vector_score_norm,
                    bm25_score_norm: r.bm25_score_norm,
                    chunk_preview,
                }
            })
            .collect();

        let sources = fusion
            .scored
            .iter()
            .map(|s: &ScoredCandidate| {
                let (extract_id, url, _) = locate(s.candidate.chunk_id);
                SourceEntry {
                    chunk_id: s.candidate.chunk_id,
                    extract_id,
                    score: s.fusion_score,
                    from_vector: s.candidate.from_vector,
                    from_bm25: s.candidate.from_bm25,
                    vector_score_raw: s.candidate.vector_score_raw,
                    bm25_score_raw: s.candidate.bm25_score_raw,
                    url,
                }
            })
            .collect();

        Self {
            query: query.to_string(),
            query_variants: query_variants.to_vec(),
            config: *config,
            candidate_counts: fusion.counts,
            ranked_chunks,
            sources,
        }
    }

    pub fn by_chunk_id(&self, id: ChunkId) -> Option<&RankedChunk> {
        self.ranked_chunks.iter().find(|r| r.chunk_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::fuse;
    use ragfuse_core::types::{Chunk, SearchHit, SourceKind};

    #[test]
    fn ranked_rows_line_up_with_fusion() {
        let store = ChunkStore::new(vec![
            Chunk::new(1, 10, "https://a", "alpha   text", vec![1.0]),
            Chunk::new(2, 20, "https://b", "bravo", vec![1.0]),
        ])
        .expect("store");
        let vector = [SearchHit { chunk_id: 2, score: 0.9, source: SourceKind::Vector },
                      SearchHit { chunk_id: 1, score: 0.1, source: SourceKind::Vector }];
        let bm25 = [SearchHit { chunk_id: 1, score: 3.0, source: SourceKind::Bm25 }];
        let fusion = fuse(&vector, &bm25, 0.7, 1);
        let trace = DebugTrace::assemble("q", &["q".into()], &RetrievalConfig::default(), &fusion, &store);

        assert_eq!(trace.ranked_chunks.len(), 1);
        assert_eq!(trace.sources.len(), 2);
        let top = &trace.ranked_chunks[0];
        assert_eq!((top.chunk_id, top.rank, top.extract_id), (2, 1, 20));
        assert_eq!(top.url, "https://b");
        assert_eq!(top.bm25_score_raw, None);
        assert_eq!(trace.sources[1].chunk_id, 1);
        assert_eq!(trace.sources[1].bm25_score_raw, Some(3.0));
        assert!(trace.by_chunk_id(1).is_none());
    }

    #[test]
    fn json_field_names_are_stable() {
        let store = ChunkStore::new(vec![Chunk::new(1, 10, "https://a", "alpha", vec![1.0])]).expect("store");
        let vector = [SearchHit { chunk_id: 1, score: 0.5, source: SourceKind::Vector }];
        let fusion = fuse(&vector, &[], 0.7, 5);
        let trace = DebugTrace::assemble("q", &["q".into()], &RetrievalConfig::default(), &fusion, &store);
        let json = serde_json::to_value(&trace).expect("json");

        for key in ["query", "query_variants", "config", "candidate_counts", "ranked_chunks", "sources"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        let counts = &json["candidate_counts"];
        assert_eq!((counts["vector"].as_u64(), counts["bm25"].as_u64(), counts["merged"].as_u64()), (Some(1), Some(0), Some(1)));
        let ranked = &json["ranked_chunks"][0];
        for key in [
            "rank", "score", "chunk_id", "extract_id", "url", "from_vector", "from_bm25",
            "vector_score_raw", "bm25_score_raw", "vector_score_norm", "bm25_score_norm", "chunk_preview",
        ] {
            assert!(ranked.get(key).is_some(), "ranked_chunks missing {key}");
        }
        assert!(ranked["bm25_score_raw"].is_null());
        let source = &json["sources"][0];
        for key in ["chunk_id", "extract_id", "score", "from_vector", "from_bm25", "vector_score_raw", "bm25_score_raw", "url"] {
            assert!(source.get(key).is_some(), "sources missing {key}");
        }
        for key in ["vector_candidate_k", "bm25_candidate_k", "fusion_alpha", "bm25_k1", "bm25_b"] {
            assert!(json["config"].get(key).is_some(), "config missing {key}");
        }
    }
}
