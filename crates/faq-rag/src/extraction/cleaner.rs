//! Answer fragment normalization

use crate::config::BoilerplateRule;
use crate::types::CellValue;

/// Turns raw answer cells into trimmed strings, dropping nulls, blanks and the
/// embedded label sub-table described by a [`BoilerplateRule`].
#[derive(Debug, Clone, Default)]
pub struct AnswerCleaner {
    rule: BoilerplateRule,
}

impl AnswerCleaner {
    pub fn new(rule: BoilerplateRule) -> Self {
        Self { rule }
    }

    /// Clean a fragment sequence, preserving order
    pub fn clean(&self, fragments: &[CellValue]) -> Vec<String> {
        let mut cleaned = Vec::with_capacity(fragments.len());
        let mut i = 0;

        while i < fragments.len() {
            if self.boilerplate_starts_at(fragments, i) {
                i += self.rule.span.max(self.rule.labels.len());
                continue;
            }

            let fragment = &fragments[i];
            if !fragment.is_null() {
                let text = fragment.to_string();
                let text = text.trim();
                if !text.is_empty() {
                    cleaned.push(text.to_string());
                }
            }
            i += 1;
        }

        cleaned
    }

    /// Clean and space-join into one answer string
    pub fn clean_joined(&self, fragments: &[CellValue]) -> String {
        self.clean(fragments).join(" ")
    }

    fn boilerplate_starts_at(&self, fragments: &[CellValue], start: usize) -> bool {
        if !self.rule.enabled || self.rule.labels.is_empty() {
            return false;
        }
        if start + self.rule.labels.len() > fragments.len() {
            return false;
        }

        self.rule.labels.iter().enumerate().all(|(offset, label)| {
            fragments[start + offset]
                .as_text()
                .is_some_and(|text| text.trim() == label)
        })
    }
}
