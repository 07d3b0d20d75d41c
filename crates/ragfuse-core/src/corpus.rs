//! Reads corpus exports: a directory tree of `*.jsonl` files, one
//! [`ChunkRecord`] per line.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::ChunkRecord;

#[derive(Debug, Clone, Default)]
pub struct CorpusLoader {
    limit: Option<usize>,
}

impl CorpusLoader {
    pub fn new() -> Self { Self::default() }

    /// Stop after this many files (sorted path order).
    pub fn with_file_limit(limit: usize) -> Self { Self { limit: Some(limit) } }

    pub fn load_dir(&self, dir: &Path) -> Result<Vec<ChunkRecord>> {
        if !dir.is_dir() {
            return Err(Error::NotFound(format!("corpus directory {}", dir.display())));
        }
        let mut files = list_jsonl_files(dir);
        if files.is_empty() {
            info!(dir = %dir.display(), "no .jsonl files found");
            return Ok(vec![]);
        }
        if let Some(limit) = self.limit {
            files.truncate(limit);
        }
        let mut records = Vec::new();
        for (file_index, path) in files.iter().enumerate() {
            debug!(file = %path.display(), n = file_index + 1, of = files.len(), "loading corpus file");
            records.extend(load_file(path)?);
        }
        info!(files = files.len(), chunks = records.len(), "corpus loaded");
        Ok(records)
    }
}

pub fn load_file(path: &Path) -> Result<Vec<ChunkRecord>> {
    let content = fs::read_to_string(path)
        .map_err(|source| Error::Io { path: path.display().to_string(), source })?;
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let rec = serde_json::from_str(line).map_err(|source| Error::Parse {
            path: path.display().to_string(),
            line: idx + 1,
            source,
        })?;
        out.push(rec);
    }
    Ok(out)
}

fn list_jsonl_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("jsonl"))
        .collect();
    files.sort();
    files
}
