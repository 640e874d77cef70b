//! File ingestion: source readers and the ingestion coordinator

pub mod coordinator;
pub mod parser;

pub use coordinator::{IngestOutcome, IngestionCoordinator};
pub use parser::{FileParser, FileType, IngestMode, SourceContent};

use crate::extraction::QaExtractor;
use crate::types::QaRecord;

/// Run the matching segmenter over decoded content, in source order
pub fn extract_records(extractor: &QaExtractor, content: &SourceContent) -> Vec<QaRecord> {
    match content {
        SourceContent::Sheets(grids) => grids
            .iter()
            .flat_map(|grid| extractor.from_grid(grid).records)
            .collect(),
        SourceContent::Lines(lines) => extractor.from_lines(lines).records,
    }
}
