//! Wiring shared by the `ragfuse` binary and its tests: corpus loading,
//! embedding of records exported without vectors, engine construction and
//! plain-text rendering.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use ragfuse_core::config::Settings;
use ragfuse_core::corpus::CorpusLoader;
use ragfuse_core::traits::Embedder;
use ragfuse_core::types::{Chunk, ChunkRecord};
use ragfuse_hybrid::{HybridEngine, QueryExpander, Retrieval, SynonymExpander};

const EMBED_BATCH: usize = 64;

/// Turn records into chunks, embedding the ones that arrived without a vector.
pub fn embed_missing(records: Vec<ChunkRecord>, embedder: &dyn Embedder, show_progress: bool) -> Result<Vec<Chunk>> {
    let missing: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.embedding.is_none())
        .map(|(i, _)| i)
        .collect();
    let mut vectors: Vec<Option<Vec<f32>>> = records.iter().map(|r| r.embedding.clone()).collect();

    if !missing.is_empty() {
        info!(count = missing.len(), "embedding chunks without vectors");
        let pb = if show_progress { ProgressBar::new(missing.len() as u64) } else { ProgressBar::hidden() };
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)")?
                .progress_chars("#>-"),
        );
        for batch in missing.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|&i| records[i].text.clone()).collect();
            let embs = embedder.embed_batch(&texts)?;
            if embs.len() != texts.len() {
                bail!("embedder returned {} vectors for {} texts", embs.len(), texts.len());
            }
            for (&i, e) in batch.iter().zip(embs) {
                vectors[i] = Some(e);
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();
    }

    records
        .into_iter()
        .zip(vectors)
        .map(|(r, v)| -> Result<Chunk> {
            let embedding = v.with_context(|| format!("chunk {} has no embedding", r.id))?;
            Ok(Chunk::new(r.id, r.extract_id, r.url, r.text, embedding))
        })
        .collect()
}

pub fn build_expander(settings: &Settings) -> Result<QueryExpander> {
    if settings.synonyms.is_empty() {
        return Ok(QueryExpander::passthrough());
    }
    Ok(QueryExpander::new(Box::new(SynonymExpander::new(&settings.synonyms)?)))
}

/// Load `corpus_dir`, build the first snapshot and return a ready engine.
pub fn load_engine(settings: &Settings, corpus_dir: &Path, embedder: Arc<dyn Embedder>, show_progress: bool) -> Result<HybridEngine> {
    let records = CorpusLoader::new()
        .load_dir(corpus_dir)
        .with_context(|| format!("loading corpus from {}", corpus_dir.display()))?;
    let chunks = embed_missing(records, embedder.as_ref(), show_progress)?;
    let engine = HybridEngine::new(settings.retrieval, embedder, build_expander(settings)?)?;
    engine.rebuild(chunks)?;
    Ok(engine)
}

pub fn render_ranking(retrieval: &Retrieval) -> String {
    let mut out = String::new();
    let counts = &retrieval.debug.candidate_counts;
    let _ = writeln!(
        out,
        "candidates: vector={} bm25={} merged={}",
        counts.vector, counts.bm25, counts.merged
    );
    for row in &retrieval.debug.ranked_chunks {
        let via = match (row.from_vector, row.from_bm25) {
            (true, true) => "both",
            (true, false) => "vector",
            (false, true) => "bm25",
            (false, false) => "-",
        };
        let _ = writeln!(
            out,
            "{:>3}. {:.4} [{}] chunk={} {}\n     {}",
            row.rank, row.score, via, row.chunk_id, row.url, row.chunk_preview
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragfuse_embed::HashEmbedder;

    #[test]
    fn embeds_only_missing_vectors() {
        let e = HashEmbedder::new(8).expect("embedder");
        let records = vec![
            ChunkRecord { id: 1, extract_id: 1, url: "u".into(), text: "alpha".into(), embedding: Some(vec![1.0; 8]) },
            ChunkRecord { id: 2, extract_id: 1, url: "u".into(), text: "bravo".into(), embedding: None },
        ];
        let chunks = embed_missing(records, &e, false).expect("embed");
        assert_eq!(chunks[0].embedding, vec![1.0; 8]);
        assert_eq!(chunks[1].embedding, e.embed_text("bravo"));
    }
}
