//! Response types

use serde::{Deserialize, Serialize};

/// Response for the grounded answer endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The grounded answer, or the policy-violation substitute
    pub response: String,
}

/// Response for the ingestion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Whether the file was processed
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Number of documents appended to the corpus
    pub documents_added: usize,
    /// Corpus size after the append
    pub total_documents: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Corpus statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Entries in the document store
    pub documents: usize,
    /// Vectors in the index
    pub vectors: usize,
    /// Index dimensionality, unknown until the first append
    pub dimensions: Option<usize>,
}
