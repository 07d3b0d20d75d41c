//! Domain types shared by the BM25 index, the vector index and the fuser.

use serde::{Deserialize, Serialize};

use crate::tokenize::tokenize;

pub type ChunkId = i64;
pub type ExtractId = i64;

/// One line of a corpus file, as produced by the external ingestion step.
///
/// `embedding` may be absent when the corpus was exported without vectors;
/// callers then fill it with their `Embedder` before building a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: ChunkId,
    #[serde(default)]
    pub extract_id: ExtractId,
    #[serde(default)]
    pub url: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// An indexed chunk of a source document.
///
/// - `id`: stable integer identity, unique within a store
/// - `extract_id`: parent extract the chunk was split from
/// - `url`: page the extract was scraped from
/// - `tokens`: output of [`tokenize`] over `text`, computed once at construction
/// - `embedding`: precomputed, assumed L2-normalized upstream
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: ChunkId,
    pub extract_id: ExtractId,
    pub url: String,
    pub text: String,
    pub tokens: Vec<String>,
    pub embedding: Vec<f32>,
}

impl Chunk {
    pub fn new(
        id: ChunkId,
        extract_id: ExtractId,
        url: impl Into<String>,
        text: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        let text = text.into();
        let tokens = tokenize(&text);
        Self { id, extract_id, url: url.into(), text, tokens, embedding }
    }

    /// Collapse whitespace and cut to `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> String {
        let collapsed = self.text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.chars().take(max_chars).collect()
    }
}

/// Indicates which retrieval method produced a hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Vector,
    Bm25,
}

/// One entry of a per-method top-K list. `score` is the raw method score;
/// higher is always better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk_id: ChunkId,
    pub score: f64,
    pub source: SourceKind,
}

/// A chunk retrieved by at least one method, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub chunk_id: ChunkId,
    pub vector_score_raw: Option<f64>,
    pub bm25_score_raw: Option<f64>,
    pub from_vector: bool,
    pub from_bm25: bool,
}

impl Candidate {
    pub fn from_both(&self) -> bool {
        self.from_vector && self.from_bm25
    }
}

/// A candidate after normalization and fusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub vector_score_norm: f64,
    pub bm25_score_norm: f64,
    pub fusion_score: f64,
}

/// One row of the fused ranking handed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionResult {
    pub chunk_id: ChunkId,
    pub rank: usize,
    pub vector_score_norm: f64,
    pub bm25_score_norm: f64,
    pub fusion_score: f64,
}

/// Corpus-wide BM25 statistics. `BTreeMap` keeps serialization and equality
/// independent of hash seeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    pub doc_count: usize,
    pub document_frequency: std::collections::BTreeMap<String, usize>,
    pub avg_chunk_length: f64,
}
