//! Persistent document store and vector index, kept positionally aligned

pub mod corpus;
pub mod document_store;
pub mod vector_index;

pub use corpus::{Corpus, CorpusStats, RetrievedDocument};
pub use document_store::DocumentStore;
pub use vector_index::{Neighbor, VectorIndex};

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Write `bytes` to a temp file next to `path`; nothing is visible at `path` yet
pub(crate) fn stage_bytes(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(dir).map_err(|e| {
        Error::persistence(format!("Failed to create {}: {}", dir.display(), e))
    })?;

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| {
        Error::persistence(format!("Failed to stage {}: {}", path.display(), e))
    })?;
    staged
        .write_all(bytes)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|e| Error::persistence(format!("Failed to write {}: {}", path.display(), e)))?;

    Ok(staged)
}

/// Atomically replace `path` with a staged file
pub(crate) fn commit_staged(staged: NamedTempFile, path: &Path) -> Result<()> {
    staged
        .persist(path)
        .map_err(|e| Error::persistence(format!("Failed to replace {}: {}", path.display(), e.error)))?;
    Ok(())
}

/// Stage and commit in one step
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let staged = stage_bytes(path, bytes)?;
    commit_staged(staged, path)
}
