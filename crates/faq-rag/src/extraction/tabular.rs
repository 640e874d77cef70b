//! Grid scanning strategy for spreadsheet sheets

use serde::{Deserialize, Serialize};

use crate::types::{Answer, CellValue, ExtractedQa, QaRecord};

use super::{AnswerCleaner, QaSegmenter, QuestionClassifier, RecordAssembler};

/// A sheet as rows of cells; row 0 holds the title in its first cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Sheet name, when read from a workbook
    pub name: Option<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { name: None, rows }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Trimmed text of the first cell, if non-empty
    pub fn title(&self) -> Option<String> {
        let cell = self.rows.first()?.first()?;
        if cell.is_null() {
            return None;
        }
        let title = cell.to_string().trim().to_string();
        (!title.is_empty()).then_some(title)
    }

    /// Rows after the title row
    pub fn body(&self) -> &[Vec<CellValue>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Scans rows left to right; the first question cell in a row opens a record
/// whose initial fragments are the cells to its right. Rows without a question
/// continue the open record.
#[derive(Debug, Clone)]
pub struct TabularSegmenter {
    classifier: QuestionClassifier,
    cleaner: AnswerCleaner,
}

impl TabularSegmenter {
    pub fn new(classifier: QuestionClassifier, cleaner: AnswerCleaner) -> Self {
        Self { classifier, cleaner }
    }
}

impl QaSegmenter<Grid> for TabularSegmenter {
    fn segment(&self, grid: &Grid) -> ExtractedQa {
        let title = grid.title();
        let mut assembler: RecordAssembler<CellValue> = RecordAssembler::new();

        for row in grid.body() {
            let question_at = row.iter().position(|cell| self.classifier.is_question(cell));

            match question_at {
                Some(col) => {
                    let question = row[col].to_string();
                    let fragments: Vec<CellValue> = row[col + 1..]
                        .iter()
                        .filter(|cell| !cell.is_null())
                        .cloned()
                        .collect();

                    assembler.open(question, fragments, |question, fragments| {
                        QaRecord::new(
                            question.trim(),
                            Answer::Fragments(self.cleaner.clean(&fragments)),
                        )
                    });
                }
                None if assembler.is_open() => {
                    assembler.extend(row.iter().filter(|cell| !cell.is_null()).cloned());
                }
                None => {}
            }
        }

        let records = assembler.finish(|question, fragments| {
            let mut question = question.trim().to_string();
            if let Some(title) = &title {
                question.push_str(" for ");
                question.push_str(title);
            }
            QaRecord::new(question, Answer::Text(self.cleaner.clean_joined(&fragments)))
        });

        tracing::debug!(
            "Sheet {:?}: {} rows -> {} records",
            grid.name,
            grid.row_count(),
            records.len()
        );

        ExtractedQa { title, records }
    }
}
