//! Provider abstractions for embeddings and LLM generation
//!
//! The pipeline and ingestion coordinator only see these traits, so the
//! Ollama backend can be swapped for another (or a stub in tests).

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use ollama::{ollama_providers, OllamaEmbedder, OllamaLlm};
