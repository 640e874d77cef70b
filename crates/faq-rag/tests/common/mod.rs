//! Deterministic in-process providers and a scratch configuration

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use faq_rag::config::RagConfig;
use faq_rag::providers::{EmbeddingProvider, LlmProvider};
use faq_rag::Result;

pub const DIMENSIONS: usize = 32;

/// Bag-of-words hashed into a fixed number of buckets
pub struct HashEmbedder {
    pub batches: AtomicUsize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self {
            batches: AtomicUsize::new(0),
        }
    }

    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            // FNV-1a
            let mut hash: u64 = 0xcbf29ce484222325;
            for byte in word.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x100000001b3);
            }
            v[(hash % DIMENSIONS as u64) as usize] += 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// Echoes the prompt followed by a fixed reply, like a raw completion
pub struct ScriptedLlm {
    pub reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok(format!("{}{}", prompt, self.reply))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }
}

/// Defaults with every artifact inside `dir`
pub fn scratch_config(dir: &tempfile::TempDir) -> RagConfig {
    let mut config = RagConfig::default();
    config.storage.documents_path = dir.path().join("bank-data.json");
    config.storage.index_path = dir.path().join("bank-data_index.bin");
    config.storage.audit_log_path = dir.path().join("security.log");
    config.embeddings.dimensions = Some(DIMENSIONS);
    config
}
