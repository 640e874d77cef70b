//! Line scanning strategy for plain text and PDF content

use crate::types::{Answer, ExtractedQa, QaRecord};

use super::{QaSegmenter, QuestionClassifier, RecordAssembler};

/// Walks lines in order: a question line opens a record, following non-empty
/// lines become its answer fragments.
#[derive(Debug, Clone)]
pub struct LinearSegmenter {
    classifier: QuestionClassifier,
}

impl LinearSegmenter {
    pub fn new(classifier: QuestionClassifier) -> Self {
        Self { classifier }
    }
}

impl<S: AsRef<str>> QaSegmenter<[S]> for LinearSegmenter {
    fn segment(&self, lines: &[S]) -> ExtractedQa {
        let mut assembler: RecordAssembler<String> = RecordAssembler::new();

        for line in lines {
            let stripped = line.as_ref().trim();
            if self.classifier.is_question_text(stripped) {
                assembler.open(stripped.to_string(), Vec::new(), |question, fragments| {
                    QaRecord::new(question, Answer::Fragments(fragments))
                });
            } else if !stripped.is_empty() {
                assembler.extend(std::iter::once(stripped.to_string()));
            }
        }

        let records = assembler.finish(|question, fragments| {
            QaRecord::new(question, Answer::Text(fragments.join(" ")))
        });

        ExtractedQa {
            title: None,
            records,
        }
    }
}
