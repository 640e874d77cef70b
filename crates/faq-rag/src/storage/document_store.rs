//! Append-only, rank-keyed document store persisted as pretty JSON

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use crate::error::{Error, Result};

/// Documents keyed by their zero-based insertion rank.
///
/// Keys are always the contiguous sequence `0..len`; on disk they are the
/// decimal strings `"0"`, `"1"`, ... written in rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStore {
    documents: Vec<String>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from disk; a missing file yields an empty store
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No document store at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let raw = std::fs::read_to_string(path)?;
        let mapping: HashMap<String, String> = serde_json::from_str(&raw)?;
        let store = Self::from_mapping(mapping)?;

        tracing::info!("Loaded {} documents from {}", store.len(), path.display());
        Ok(store)
    }

    /// Build from a key -> text mapping, rejecting non-contiguous keys
    pub fn from_mapping(mapping: HashMap<String, String>) -> Result<Self> {
        let len = mapping.len();
        let mut slots: Vec<Option<String>> = vec![None; len];

        for (key, text) in mapping {
            let rank: usize = key.parse().map_err(|_| {
                Error::persistence(format!("Document store key '{}' is not a rank", key))
            })?;
            let slot = slots.get_mut(rank).ok_or_else(|| {
                Error::persistence(format!("Document store key {} leaves a gap (len {})", rank, len))
            })?;
            *slot = Some(text);
        }

        // Distinct in-range keys over `len` slots fill every slot
        let documents = slots.into_iter().flatten().collect::<Vec<_>>();
        if documents.len() != len {
            return Err(Error::persistence("Document store keys are not contiguous"));
        }

        Ok(Self { documents })
    }

    /// Append documents, assigning ranks from the current length; returns the new ranks
    pub fn append<I>(&mut self, documents: I) -> Range<usize>
    where
        I: IntoIterator<Item = String>,
    {
        let start = self.documents.len();
        self.documents.extend(documents);
        start..self.documents.len()
    }

    pub fn get(&self, rank: usize) -> Option<&str> {
        self.documents.get(rank).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in rank order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.documents.iter().enumerate().map(|(i, d)| (i, d.as_str()))
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.documents.truncate(len);
    }

    /// Deterministic pretty JSON (rank order, non-ASCII preserved)
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Persist atomically via a temp file
    pub fn save(&self, path: &Path) -> Result<()> {
        super::write_atomic(path, self.to_json_pretty()?.as_bytes())
    }
}

impl Serialize for DocumentStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.documents.len()))?;
        for (rank, text) in self.documents.iter().enumerate() {
            map.serialize_entry(&rank.to_string(), text)?;
        }
        map.end()
    }
}
