//! Core types for the FAQ RAG system

pub mod qa;
pub mod query;
pub mod response;

pub use qa::{Answer, CellValue, ExtractedQa, QaRecord};
pub use query::QueryRequest;
pub use response::{IngestResponse, QueryResponse};
