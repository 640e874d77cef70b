//! faq-rag: FAQ question answering with content-policy guardrails
//!
//! Extracts question/answer pairs from spreadsheets, PDFs and text files,
//! keeps them in a document store positionally aligned with a vector index,
//! and answers queries with an LLM grounded on the nearest entries. Queries
//! and answers pass through a disallowed-term and prompt-injection policy;
//! every rejection is written to an audit log.

pub mod config;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod ingestion;
pub mod policy;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use extraction::QaExtractor;
pub use ingestion::{IngestMode, IngestionCoordinator};
pub use retrieval::QueryPipeline;
pub use storage::Corpus;
pub use types::{
    qa::{Answer, CellValue, QaRecord},
    query::QueryRequest,
    response::QueryResponse,
};
