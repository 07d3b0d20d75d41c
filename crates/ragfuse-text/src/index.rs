use std::collections::{BTreeMap, HashMap};

use tracing::{debug, instrument};

use ragfuse_core::store::ChunkStore;
use ragfuse_core::types::{ChunkId, CorpusStats};

use crate::params::Bm25Params;

/// Immutable BM25 index. Document `i` is `store.chunks()[i]`.
///
/// There is no incremental update: document frequency and average length
/// depend on the whole corpus, so any change to the chunk set means building
/// a new index.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    pub(crate) params: Bm25Params,
    pub(crate) chunk_ids: Vec<ChunkId>,
    pub(crate) doc_lens: Vec<usize>,
    pub(crate) term_freqs: Vec<HashMap<String, u32>>,
    pub(crate) postings: HashMap<String, Vec<(usize, u32)>>,
    pub(crate) doc_freq: HashMap<String, usize>,
    pub(crate) avg_len: f64,
}

impl Bm25Index {
    #[instrument(skip_all, fields(chunks = store.len()))]
    pub fn build(store: &ChunkStore, params: Bm25Params) -> Self {
        let n = store.len();
        let mut chunk_ids = Vec::with_capacity(n);
        let mut doc_lens = Vec::with_capacity(n);
        let mut term_freqs = Vec::with_capacity(n);
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;

        for (doc, chunk) in store.chunks().iter().enumerate() {
            let mut tf: HashMap<String, u32> = HashMap::new();
            for token in &chunk.tokens {
                *tf.entry(token.clone()).or_insert(0) += 1;
            }
            for (term, &count) in &tf {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
                postings.entry(term.clone()).or_default().push((doc, count));
            }
            chunk_ids.push(chunk.id);
            doc_lens.push(chunk.tokens.len());
            total_len += chunk.tokens.len();
            term_freqs.push(tf);
        }

        let avg_len = if n == 0 { 0.0 } else { total_len as f64 / n as f64 };
        debug!(docs = n, terms = doc_freq.len(), avg_len, "bm25 index built");
        Self { params, chunk_ids, doc_lens, term_freqs, postings, doc_freq, avg_len }
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    pub fn doc_count(&self) -> usize {
        self.chunk_ids.len()
    }

    pub fn avg_len(&self) -> f64 {
        self.avg_len
    }

    pub fn df(&self, term: &str) -> usize {
        self.doc_freq.get(term).copied().unwrap_or(0)
    }

    pub fn tf(&self, doc: usize, term: &str) -> u32 {
        self.term_freqs.get(doc).and_then(|m| m.get(term)).copied().unwrap_or(0)
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            doc_count: self.doc_count(),
            document_frequency: self
                .doc_freq
                .iter()
                .map(|(t, &c)| (t.clone(), c))
                .collect::<BTreeMap<_, _>>(),
            avg_chunk_length: self.avg_len,
        }
    }
}
