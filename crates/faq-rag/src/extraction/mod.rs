//! Question/answer extraction from tabular and linear sources
//!
//! Both segmenters share the [`QuestionClassifier`] and the record emission
//! rules of [`RecordAssembler`]; they differ only in how they walk their input.

pub mod classifier;
pub mod cleaner;
pub mod linear;
pub mod tabular;

pub use classifier::QuestionClassifier;
pub use cleaner::AnswerCleaner;
pub use linear::LinearSegmenter;
pub use tabular::{Grid, TabularSegmenter};

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::types::{ExtractedQa, QaRecord};

/// Lead words that make a period-terminated sentence a question
pub const DEFAULT_LEAD_WORDS: &[&str] = &[
    "is", "please", "what", "how", "when", "where", "why", "are", "can", "do", "does",
    "shall", "should", "could", "would", "will", "who", "which",
];

/// A strategy that segments one kind of source into QA records
pub trait QaSegmenter<Source: ?Sized> {
    /// Segment the source into ordered records
    fn segment(&self, source: &Source) -> ExtractedQa;
}

/// Both segmentation strategies, configured once
#[derive(Debug, Clone)]
pub struct QaExtractor {
    tabular: TabularSegmenter,
    linear: LinearSegmenter,
}

impl QaExtractor {
    /// Build from extraction configuration
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let classifier = QuestionClassifier::new(&config.question_lead_words)?;
        let cleaner = AnswerCleaner::new(config.boilerplate.clone());

        Ok(Self {
            tabular: TabularSegmenter::new(classifier.clone(), cleaner),
            linear: LinearSegmenter::new(classifier),
        })
    }

    /// Segment a sheet grid
    pub fn from_grid(&self, grid: &Grid) -> ExtractedQa {
        self.tabular.segment(grid)
    }

    /// Segment text lines
    pub fn from_lines<S: AsRef<str>>(&self, lines: &[S]) -> ExtractedQa {
        self.linear.segment(lines)
    }
}

impl Default for QaExtractor {
    fn default() -> Self {
        let classifier = QuestionClassifier::default();
        Self {
            tabular: TabularSegmenter::new(classifier.clone(), AnswerCleaner::default()),
            linear: LinearSegmenter::new(classifier),
        }
    }
}

struct OpenRecord<F> {
    question: String,
    fragments: Vec<F>,
}

/// Open/close bookkeeping shared by the segmenters.
///
/// A record is emitted only when it is closed with at least one fragment
/// and its finished answer is non-empty.
pub(crate) struct RecordAssembler<F> {
    open: Option<OpenRecord<F>>,
    records: Vec<QaRecord>,
}

impl<F> RecordAssembler<F> {
    pub(crate) fn new() -> Self {
        Self {
            open: None,
            records: Vec::new(),
        }
    }

    /// Close the current record (via `close`) and open a new one
    pub(crate) fn open<C>(&mut self, question: String, fragments: Vec<F>, close: C)
    where
        C: FnOnce(String, Vec<F>) -> QaRecord,
    {
        self.close_with(close);
        self.open = Some(OpenRecord {
            question,
            fragments,
        });
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Append continuation fragments to the open record, if any
    pub(crate) fn extend<I: IntoIterator<Item = F>>(&mut self, fragments: I) {
        if let Some(open) = self.open.as_mut() {
            open.fragments.extend(fragments);
        }
    }

    /// Close the last record with `close` and return everything emitted
    pub(crate) fn finish<C>(mut self, close: C) -> Vec<QaRecord>
    where
        C: FnOnce(String, Vec<F>) -> QaRecord,
    {
        self.close_with(close);
        self.records
    }

    fn close_with<C>(&mut self, close: C)
    where
        C: FnOnce(String, Vec<F>) -> QaRecord,
    {
        if let Some(open) = self.open.take() {
            if open.fragments.is_empty() {
                return;
            }
            // Cleaning may leave nothing behind
            let record = close(open.question, open.fragments);
            if !record.answer.is_empty() {
                self.records.push(record);
            }
        }
    }
}
