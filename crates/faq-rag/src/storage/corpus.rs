//! The document store and vector index as one logical sequence
//!
//! Both structures share a single length: entry `i` of the store is the text
//! whose embedding sits at ordinal `i` of the index. Readers take one read
//! guard for search and lookup, so they always see a matched pair; appends
//! mutate and persist both under one write guard.

use parking_lot::RwLock;
use serde::Serialize;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::config::{EmbeddingConfig, StorageConfig};
use crate::error::{Error, Result};

use super::{commit_staged, stage_bytes, DocumentStore, VectorIndex};

/// A retrieved document with its ordinal and distance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedDocument {
    pub ordinal: usize,
    pub distance: f32,
    pub text: String,
}

/// Corpus statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub documents: usize,
    pub vectors: usize,
    pub dimensions: Option<usize>,
}

struct CorpusInner {
    documents: DocumentStore,
    /// Created with the dimensionality of the first appended batch
    index: Option<VectorIndex>,
}

impl CorpusInner {
    fn vector_count(&self) -> usize {
        self.index.as_ref().map_or(0, VectorIndex::len)
    }
}

/// Positionally aligned document store and vector index
pub struct Corpus {
    inner: RwLock<CorpusInner>,
    documents_path: PathBuf,
    index_path: PathBuf,
    expected_dimensions: Option<usize>,
}

impl Corpus {
    /// Open (or start empty) from the configured artifact paths
    pub fn from_config(storage: &StorageConfig, embeddings: &EmbeddingConfig) -> Result<Self> {
        Self::open(&storage.documents_path, &storage.index_path, embeddings.dimensions)
    }

    /// Load both artifacts. A longer index is truncated; a longer document store is an error
    pub fn open(
        documents_path: &Path,
        index_path: &Path,
        expected_dimensions: Option<usize>,
    ) -> Result<Self> {
        let documents = DocumentStore::load(documents_path)?;
        let mut index = VectorIndex::load(index_path)?;

        if let (Some(index), Some(expected)) = (&index, expected_dimensions) {
            if index.dimensions() != expected {
                return Err(Error::vector_index(format!(
                    "Index at {} has {} dimensions, configured embeddings have {}",
                    index_path.display(),
                    index.dimensions(),
                    expected
                )));
            }
        }

        let vectors = index.as_ref().map_or(0, VectorIndex::len);
        if documents.len() > vectors {
            return Err(Error::vector_index(format!(
                "Document store has {} entries but vector index has {}; re-index required",
                documents.len(),
                vectors
            )));
        }
        if vectors > documents.len() {
            // Only an interrupted persist leaves the index ahead of the documents
            tracing::warn!(
                "Vector index ({}) is ahead of the document store ({}), truncating index",
                vectors,
                documents.len()
            );
            if let Some(index) = index.as_mut() {
                index.truncate(documents.len());
            }
        }

        tracing::info!("Corpus opened with {} entries", documents.len());

        Ok(Self {
            inner: RwLock::new(CorpusInner { documents, index }),
            documents_path: documents_path.to_path_buf(),
            index_path: index_path.to_path_buf(),
            expected_dimensions,
        })
    }

    /// Number of aligned entries
    pub fn len(&self) -> usize {
        self.inner.read().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CorpusStats {
        let inner = self.inner.read();
        CorpusStats {
            documents: inner.documents.len(),
            vectors: inner.vector_count(),
            dimensions: inner.index.as_ref().map(VectorIndex::dimensions),
        }
    }

    /// Text at an ordinal
    pub fn document(&self, ordinal: usize) -> Option<String> {
        self.inner.read().documents.get(ordinal).map(str::to_string)
    }

    /// Append documents with their embeddings and persist both artifacts.
    ///
    /// Either both structures (in memory and on disk) gain the new entries or
    /// neither does. Returns the ordinals assigned.
    pub fn append(&self, documents: Vec<String>, embeddings: Vec<Vec<f32>>) -> Result<Range<usize>> {
        if documents.len() != embeddings.len() {
            return Err(Error::embedding(format!(
                "Got {} embeddings for {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let mut inner = self.inner.write();
        let previous = inner.documents.len();
        if documents.is_empty() {
            return Ok(previous..previous);
        }

        let dimensions = embeddings[0].len();
        if let Some(expected) = self.expected_dimensions {
            if dimensions != expected {
                return Err(Error::vector_index(format!(
                    "Embedding has {} dimensions, configured for {}",
                    dimensions, expected
                )));
            }
        }

        let created = inner.index.is_none();
        if created {
            inner.index = Some(VectorIndex::new(dimensions)?);
        }

        let added = match inner.index.as_mut() {
            Some(index) => index.add(&embeddings),
            None => Err(Error::internal("Vector index missing after creation")),
        };
        if let Err(e) = added {
            if created {
                inner.index = None;
            }
            return Err(e);
        }
        let ordinals = inner.documents.append(documents);

        if let Err(e) = self.persist(&inner) {
            tracing::error!("Persisting corpus failed, rolling back to {} entries: {}", previous, e);
            inner.documents.truncate(previous);
            if created {
                inner.index = None;
            } else if let Some(index) = inner.index.as_mut() {
                index.truncate(previous);
            }
            self.restore(&inner);
            return Err(e);
        }

        tracing::info!(
            "Appended {} entries (ordinals {}..{})",
            ordinals.len(),
            ordinals.start,
            ordinals.end
        );
        Ok(ordinals)
    }

    /// The `top_k` nearest documents to `query`, nearest first
    pub fn retrieve(&self, query: &[f32], top_k: usize) -> Result<Vec<RetrievedDocument>> {
        let inner = self.inner.read();
        let Some(index) = inner.index.as_ref() else {
            return Ok(Vec::new());
        };

        let neighbors = index.search(query, top_k)?;
        Ok(neighbors
            .into_iter()
            .filter_map(|n| {
                let text = inner.documents.get(n.ordinal);
                if text.is_none() {
                    tracing::warn!("No document for ordinal {}", n.ordinal);
                }
                text.map(|text| RetrievedDocument {
                    ordinal: n.ordinal,
                    distance: n.distance,
                    text: text.to_string(),
                })
            })
            .collect())
    }

    /// Stage both artifacts, then swap them into place
    fn persist(&self, inner: &CorpusInner) -> Result<()> {
        let index_bytes = match &inner.index {
            Some(index) => index.to_bytes()?,
            None => return Err(Error::internal("Persisting corpus without an index")),
        };
        let documents_json = inner.documents.to_json_pretty()?;

        let staged_index = stage_bytes(&self.index_path, &index_bytes)?;
        let staged_documents = stage_bytes(&self.documents_path, documents_json.as_bytes())?;

        commit_staged(staged_index, &self.index_path)?;
        commit_staged(staged_documents, &self.documents_path)
    }

    /// Best-effort rewrite of the rolled-back state, in case the index was
    /// already swapped in when the document store failed
    fn restore(&self, inner: &CorpusInner) {
        let result = match &inner.index {
            Some(index) => index.save(&self.index_path),
            None if self.index_path.exists() => {
                std::fs::remove_file(&self.index_path).map_err(Error::from)
            }
            None => Ok(()),
        };
        if let Err(e) = result {
            tracing::error!(
                "Could not restore {} after failed append: {}",
                self.index_path.display(),
                e
            );
        }
    }
}
