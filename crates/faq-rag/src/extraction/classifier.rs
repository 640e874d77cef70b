//! Question detection for cell and line values

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::types::CellValue;

use super::DEFAULT_LEAD_WORDS;

static DEFAULT_LEAD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    lead_word_regex(DEFAULT_LEAD_WORDS).expect("default lead words form a valid pattern")
});

fn lead_word_regex<S: AsRef<str>>(words: &[S]) -> std::result::Result<Regex, regex::Error> {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w.as_ref().trim()))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)^\s*({})\b.*\.$", alternation))
}

/// Decides whether a value is a question.
///
/// A string is a question when, trimmed, it ends with `?`, or it starts with one
/// of the lead words and ends with a period.
#[derive(Debug, Clone)]
pub struct QuestionClassifier {
    lead_pattern: Option<Regex>,
}

impl QuestionClassifier {
    /// Build a classifier over a custom lead-word list
    pub fn new<S: AsRef<str>>(lead_words: &[S]) -> Result<Self> {
        let words: Vec<&str> = lead_words
            .iter()
            .map(|w| w.as_ref())
            .filter(|w| !w.trim().is_empty())
            .collect();

        if words.is_empty() {
            return Ok(Self { lead_pattern: None });
        }

        let lead_pattern = lead_word_regex(&words)
            .map_err(|e| Error::Config(format!("Invalid question lead words: {}", e)))?;
        Ok(Self {
            lead_pattern: Some(lead_pattern),
        })
    }

    /// Classify a raw cell; non-text cells are never questions
    pub fn is_question(&self, value: &CellValue) -> bool {
        value.as_text().is_some_and(|text| self.is_question_text(text))
    }

    /// Classify a line of text
    pub fn is_question_text(&self, text: &str) -> bool {
        let stripped = text.trim();
        if stripped.ends_with('?') {
            return true;
        }
        self.lead_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(stripped))
    }
}

impl Default for QuestionClassifier {
    fn default() -> Self {
        Self {
            lead_pattern: Some(DEFAULT_LEAD_PATTERN.clone()),
        }
    }
}
