//! Chunk store: the immutable corpus an index snapshot is built from.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkId, ChunkRecord};

/// Chunks in insertion order plus an id lookup. Positions (`usize`) are the
/// document indices used by the BM25 and vector indices.
#[derive(Debug, Clone, Default)]
pub struct ChunkStore {
    chunks: Vec<Chunk>,
    by_id: HashMap<ChunkId, usize>,
}

impl ChunkStore {
    pub fn new(chunks: Vec<Chunk>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(chunks.len());
        for (pos, chunk) in chunks.iter().enumerate() {
            if by_id.insert(chunk.id, pos).is_some() {
                return Err(Error::InvalidConfig(format!("duplicate chunk id {}", chunk.id)));
            }
        }
        Ok(Self { chunks, by_id })
    }

    /// Build from corpus records. Every record must already carry an embedding.
    pub fn from_records(records: Vec<ChunkRecord>) -> Result<Self> {
        let mut chunks = Vec::with_capacity(records.len());
        for rec in records {
            let embedding = rec
                .embedding
                .ok_or_else(|| Error::InvalidConfig(format!("chunk {} has no embedding", rec.id)))?;
            chunks.push(Chunk::new(rec.id, rec.extract_id, rec.url, rec.text, embedding));
        }
        Self::new(chunks)
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        self.by_id.get(&id).map(|&pos| &self.chunks[pos])
    }

    pub fn position(&self, id: ChunkId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
