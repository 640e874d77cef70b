//! Configuration for the FAQ RAG system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Ollama/LLM configuration
    pub llm: LlmConfig,
    /// Document store, vector index and audit log locations
    pub storage: StorageConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// QA extraction heuristics
    pub extraction: ExtractionConfig,
    /// Content policy lists
    pub policy: PolicyConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))
    }

    /// Load from the path in `FAQ_RAG_CONFIG`, if set
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os("FAQ_RAG_CONFIG").map(PathBuf::from);
        Self::load(path.as_deref())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Ollama embedding model
    pub model: String,
    /// Expected dimensionality; checked against the index when set
    pub dimensions: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-minilm".to_string(),
            dimensions: Some(384),
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Cap on generated tokens
    pub max_new_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            generate_model: "qwen:1.8b-chat".to_string(),
            temperature: 0.7,
            max_new_tokens: 200,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Persisted artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Document store (JSON, key -> text)
    pub documents_path: PathBuf,
    /// Vector index (binary)
    pub index_path: PathBuf,
    /// Append-only audit log of policy rejections
    pub audit_log_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("faq-rag");

        Self {
            documents_path: data_dir.join("bank-data.json"),
            index_path: data_dir.join("bank-data_index.bin"),
            audit_log_path: data_dir.join("security.log"),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of documents placed in the grounded prompt
    pub top_k: usize,
    /// Separator between context documents
    pub context_separator: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            context_separator: "\n---\n".to_string(),
        }
    }
}

/// QA extraction heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Leading workbook sheets that hold no QA tables
    pub skip_sheets: usize,
    /// Words that mark a period-terminated sentence as a question
    pub question_lead_words: Vec<String>,
    /// Embedded label sub-table to drop from answers
    pub boilerplate: BoilerplateRule,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            skip_sheets: 2,
            question_lead_words: crate::extraction::DEFAULT_LEAD_WORDS
                .iter()
                .map(|w| w.to_string())
                .collect(),
            boilerplate: BoilerplateRule::default(),
        }
    }
}

/// A run of labelled fragments dropped as a unit from answer content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoilerplateRule {
    /// Set to false to keep every fragment
    pub enabled: bool,
    /// Consecutive labels that open the run
    pub labels: Vec<String>,
    /// Total fragments dropped, labels included
    pub span: usize,
}

impl Default for BoilerplateRule {
    fn default() -> Self {
        Self {
            enabled: true,
            labels: vec!["Profit Payment".to_string(), "Profit Rate".to_string()],
            span: 5,
        }
    }
}

/// Content policy lists
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Case-insensitive substrings rejected in queries and responses
    pub disallowed_terms: Vec<String>,
    /// Case-insensitive regexes rejected in queries
    pub injection_patterns: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            disallowed_terms: crate::policy::DEFAULT_DISALLOWED_TERMS
                .iter()
                .map(|t| t.to_string())
                .collect(),
            injection_patterns: crate::policy::DEFAULT_INJECTION_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.extraction.skip_sheets, 2);
        assert!(config.extraction.boilerplate.enabled);
        assert_eq!(config.extraction.boilerplate.span, 5);
        assert!(config.policy.disallowed_terms.iter().any(|t| t == "hack"));
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[retrieval]
top_k = 5

[llm]
generate_model = "llama3.2:3b"
"#
        )
        .unwrap();

        let config = RagConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.context_separator, "\n---\n");
        assert_eq!(config.llm.generate_model, "llama3.2:3b");
        assert_eq!(config.llm.max_new_tokens, 200);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = RagConfig::load(Some(Path::new("/nonexistent/faq-rag.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
