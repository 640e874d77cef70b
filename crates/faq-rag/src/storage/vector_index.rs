//! Exact L2 nearest-neighbor index over embeddings, addressed by insertion ordinal

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::Range;
use std::path::Path;

use crate::error::{Error, Result};

const FORMAT_VERSION: u32 = 1;

/// A search hit: ordinal position and squared L2 distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub ordinal: usize,
    pub distance: f32,
}

/// Flat (brute-force) vector index.
///
/// Vectors are stored contiguously; the i-th vector ever added has ordinal `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    version: u32,
    dimensions: usize,
    vectors: Vec<f32>,
}

impl VectorIndex {
    /// Create an empty index for vectors of the given dimensionality
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::vector_index("Index dimensionality must be positive"));
        }
        Ok(Self {
            version: FORMAT_VERSION,
            dimensions,
            vectors: Vec::new(),
        })
    }

    /// Load from disk; `None` when the file does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        let index = Self::from_bytes(&bytes)?;
        tracing::info!(
            "Loaded vector index from {} ({} vectors, {} dims)",
            path.display(),
            index.len(),
            index.dimensions
        );
        Ok(Some(index))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (index, _): (Self, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| Error::vector_index(format!("Corrupt index artifact: {}", e)))?;

        if index.version != FORMAT_VERSION {
            return Err(Error::vector_index(format!(
                "Unsupported index format version {}",
                index.version
            )));
        }
        if index.dimensions == 0 || index.vectors.len() % index.dimensions != 0 {
            return Err(Error::vector_index("Index data does not match its dimensionality"));
        }
        Ok(index)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| Error::vector_index(format!("Failed to encode index: {}", e)))
    }

    /// Persist atomically via a temp file
    pub fn save(&self, path: &Path) -> Result<()> {
        super::write_atomic(path, &self.to_bytes()?)
    }

    /// Append vectors in order; returns their ordinals.
    ///
    /// All vectors are validated before any is added.
    pub fn add(&mut self, embeddings: &[Vec<f32>]) -> Result<Range<usize>> {
        if let Some(bad) = embeddings.iter().find(|v| v.len() != self.dimensions) {
            return Err(Error::vector_index(format!(
                "Embedding has {} dimensions, index expects {}",
                bad.len(),
                self.dimensions
            )));
        }

        let start = self.len();
        self.vectors.reserve(embeddings.len() * self.dimensions);
        for embedding in embeddings {
            self.vectors.extend_from_slice(embedding);
        }
        Ok(start..self.len())
    }

    /// The `top_k` nearest vectors, nearest first; fewer when the index is smaller
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimensions {
            return Err(Error::vector_index(format!(
                "Query has {} dimensions, index expects {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(ordinal, vector)| Neighbor {
                ordinal,
                distance: squared_l2(query, vector),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.ordinal.cmp(&b.ordinal))
        });
        neighbors.truncate(top_k);
        Ok(neighbors)
    }

    pub fn len(&self) -> usize {
        self.vectors.len() / self.dimensions
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.vectors.truncate(len * self.dimensions);
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_sequential_ordinals() {
        let mut index = VectorIndex::new(2).unwrap();
        assert_eq!(index.add(&[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap(), 0..2);
        assert_eq!(index.add(&[vec![2.0, 2.0]]).unwrap(), 2..3);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_search_nearest_first() {
        let mut index = VectorIndex::new(2).unwrap();
        index
            .add(&[vec![10.0, 0.0], vec![1.0, 0.0], vec![3.0, 0.0]])
            .unwrap();

        let hits = index.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(hits.iter().map(|h| h.ordinal).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(hits[0].distance, 1.0);
        assert_eq!(hits[1].distance, 9.0);
    }

    #[test]
    fn test_top_k_larger_than_index() {
        let mut index = VectorIndex::new(1).unwrap();
        index.add(&[vec![5.0], vec![1.0]]).unwrap();

        let hits = index.search(&[0.0], 3).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].ordinal, 1);
        assert_eq!(hits[1].ordinal, 0);
    }

    #[test]
    fn test_dimension_mismatch_leaves_index_untouched() {
        let mut index = VectorIndex::new(2).unwrap();
        index.add(&[vec![0.0, 0.0]]).unwrap();

        let result = index.add(&[vec![1.0, 1.0], vec![1.0]]);
        assert!(matches!(result, Err(Error::VectorIndex(_))));
        assert_eq!(index.len(), 1);
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");

        let mut index = VectorIndex::new(3).unwrap();
        index.add(&[vec![0.1, 0.2, 0.3], vec![-1.0, 0.5, 2.0]]).unwrap();
        index.save(&path).unwrap();

        let loaded = VectorIndex::load(&path).unwrap().unwrap();
        assert_eq!(loaded, index);
        assert!(VectorIndex::load(&dir.path().join("missing.bin")).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_artifact_rejected() {
        assert!(VectorIndex::from_bytes(b"not an index").is_err());
    }
}
