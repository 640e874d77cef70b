//! Retrieval-and-guard pipeline

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::policy::{AuditLog, AuditStage, ContentPolicy, RESPONSE_FILTERED_MESSAGE};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::storage::{Corpus, RetrievedDocument};

/// Answers queries from the corpus, guarded by the content policy on both sides
pub struct QueryPipeline {
    corpus: Arc<Corpus>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    policy: ContentPolicy,
    audit: Arc<AuditLog>,
    prompt: PromptBuilder,
    top_k: usize,
}

impl QueryPipeline {
    pub fn new(
        corpus: Arc<Corpus>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        policy: ContentPolicy,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            corpus,
            embedder,
            llm,
            policy,
            audit,
            prompt: PromptBuilder::default(),
            top_k: 3,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_prompt_builder(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Reject (and audit) a query that matches the policy
    pub fn check_query(&self, query: &str) -> Result<()> {
        self.policy.check_query(query).map_err(|violation| {
            let reason = violation.to_string();
            self.audit.record(AuditStage::Query, query, &reason);
            Error::PolicyViolation(reason)
        })
    }

    /// Nearest documents for a query, nearest first
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedDocument>> {
        let embedding = self.embedder.embed(query).await?;

        let corpus = Arc::clone(&self.corpus);
        let top_k = self.top_k;
        tokio::task::spawn_blocking(move || corpus.retrieve(&embedding, top_k))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    /// Full guarded flow. A rejected query returns `Error::PolicyViolation`;
    /// a rejected answer is replaced by the fixed filtered message.
    pub async fn answer(&self, query: &str) -> Result<String> {
        self.check_query(query)?;

        let documents = self.retrieve(query).await?;
        tracing::debug!("Retrieved {} documents for query", documents.len());

        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let prompt = self.prompt.build_prompt(query, &texts);

        let generated = self.llm.generate(&prompt).await?;
        let answer = PromptBuilder::extract_answer(&generated);

        if let Err(violation) = self.policy.check_response(&answer) {
            let reason = format!(
                "Response contains disallowed term '{}': {}",
                violation.matched(),
                answer
            );
            self.audit.record(AuditStage::Response, query, &reason);
            return Ok(RESPONSE_FILTERED_MESSAGE.to_string());
        }

        Ok(answer)
    }
}
