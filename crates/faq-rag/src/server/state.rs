//! Application state for the FAQ RAG server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::extraction::QaExtractor;
use crate::generation::PromptBuilder;
use crate::ingestion::IngestionCoordinator;
use crate::policy::{AuditLog, ContentPolicy};
use crate::providers::{ollama_providers, EmbeddingProvider, LlmProvider};
use crate::retrieval::QueryPipeline;
use crate::storage::Corpus;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Aligned document store and vector index
    corpus: Arc<Corpus>,
    /// Serialized writer
    coordinator: IngestionCoordinator,
    /// Guarded query flow
    pipeline: QueryPipeline,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create state backed by Ollama
    pub async fn new(config: RagConfig) -> Result<Self> {
        let (embedder, llm) = ollama_providers(&config.llm, &config.embeddings)?;
        tracing::info!(
            "Ollama at {} (embeddings: {}, generation: {})",
            config.llm.base_url,
            config.embeddings.model,
            config.llm.generate_model
        );
        Self::with_providers(config, Arc::new(embedder), Arc::new(llm))
    }

    /// Create state over arbitrary providers
    pub fn with_providers(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        tracing::info!("Initializing FAQ RAG application state...");

        let corpus = Arc::new(Corpus::from_config(&config.storage, &config.embeddings)?);
        let stats = corpus.stats();
        tracing::info!(
            "Corpus loaded: {} documents, {} vectors",
            stats.documents,
            stats.vectors
        );

        let coordinator = IngestionCoordinator::new(
            Arc::clone(&corpus),
            Arc::clone(&embedder),
            QaExtractor::new(&config.extraction)?,
            config.extraction.skip_sheets,
        );

        let pipeline = QueryPipeline::new(
            Arc::clone(&corpus),
            Arc::clone(&embedder),
            Arc::clone(&llm),
            ContentPolicy::new(&config.policy)?,
            Arc::new(AuditLog::new(config.storage.audit_log_path.clone())),
        )
        .with_top_k(config.retrieval.top_k)
        .with_prompt_builder(PromptBuilder::new(config.retrieval.context_separator.clone()));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                corpus,
                coordinator,
                pipeline,
                embedder,
                llm,
                ready: RwLock::new(true),
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.inner.corpus
    }

    pub fn coordinator(&self) -> &IngestionCoordinator {
        &self.inner.coordinator
    }

    pub fn pipeline(&self) -> &QueryPipeline {
        &self.inner.pipeline
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    /// Check if ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }

    /// Health-check both providers and record the result as readiness
    pub async fn check_providers(&self) -> bool {
        let embedder = match self.inner.embedder.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!(
                    "Embedding provider {} health check failed: {}",
                    self.inner.embedder.name(),
                    e
                );
                false
            }
        };
        let llm = match self.inner.llm.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!(
                    "LLM provider {} health check failed: {}",
                    self.inner.llm.name(),
                    e
                );
                false
            }
        };

        let ready = embedder && llm;
        self.set_ready(ready);
        ready
    }
}
