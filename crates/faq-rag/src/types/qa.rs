//! Question/answer extraction types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar cell from a 2-D source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Text content, if this is a string cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            // Whole numbers print without a fractional part
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Answer text as emitted by a segmenter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Fragments(Vec<String>),
}

impl Answer {
    /// Single answer string; fragments are space-joined
    pub fn to_text(&self) -> String {
        match self {
            Answer::Text(s) => s.trim().to_string(),
            Answer::Fragments(parts) => parts
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_text().is_empty()
    }
}

/// An extracted question paired with its answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaRecord {
    pub question: String,
    pub answer: Answer,
}

impl QaRecord {
    pub fn new(question: impl Into<String>, answer: Answer) -> Self {
        Self {
            question: question.into(),
            answer,
        }
    }

    /// Stored document form; `None` when question or answer is empty
    pub fn to_document(&self) -> Option<String> {
        let question = self.question.trim();
        let answer = self.answer.to_text();
        if question.is_empty() || answer.is_empty() {
            return None;
        }
        Some(format!("Q: {}\nA: {}", question, answer))
    }
}

/// Records extracted from one source (sheet, text file, PDF)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedQa {
    /// Title cell of a sheet, when present
    pub title: Option<String>,
    /// Records in source order
    pub records: Vec<QaRecord>,
}

/// On-disk QA collection: `{"questions": [{question, answer}, ...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaCollection {
    #[serde(default)]
    pub questions: Vec<QaRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_template() {
        let record = QaRecord::new(
            "What is the minimum balance?",
            Answer::Text("PKR 5,000.".to_string()),
        );
        assert_eq!(
            record.to_document().as_deref(),
            Some("Q: What is the minimum balance?\nA: PKR 5,000.")
        );
    }

    #[test]
    fn test_empty_answer_dropped() {
        let record = QaRecord::new("Is this empty?", Answer::Fragments(vec!["  ".to_string()]));
        assert!(record.to_document().is_none());

        let record = QaRecord::new("   ", Answer::Text("something".to_string()));
        assert!(record.to_document().is_none());
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Number(5000.0).to_string(), "5000");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
        assert_eq!(CellValue::Bool(true).to_string(), "True");
        assert_eq!(CellValue::from("Monthly").to_string(), "Monthly");
    }

    #[test]
    fn test_collection_accepts_fragment_answers() {
        let json = r#"{"questions": [
            {"question": "How do I apply?", "answer": ["Visit", "a branch."]},
            {"question": "Is there a fee?", "answer": "No."}
        ]}"#;
        let collection: QaCollection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.questions.len(), 2);
        assert_eq!(collection.questions[0].answer.to_text(), "Visit a branch.");
    }
}
