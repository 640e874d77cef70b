//! Turns records or paragraphs into aligned store and index entries

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::extraction::QaExtractor;
use crate::providers::EmbeddingProvider;
use crate::storage::Corpus;
use crate::types::QaRecord;

use super::parser::{paragraphs, FileParser, IngestMode, SourceContent};

/// Result of one ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Documents appended by this call
    pub documents_added: usize,
    /// Corpus size afterwards
    pub total_documents: usize,
}

/// Embeds new documents in one batch and appends them to the corpus.
///
/// Ingestions are serialized: embedding happens outside the corpus lock, so
/// two overlapping ingestions would otherwise interleave their appends.
pub struct IngestionCoordinator {
    corpus: Arc<Corpus>,
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: QaExtractor,
    skip_sheets: usize,
    write_lock: Mutex<()>,
}

impl IngestionCoordinator {
    pub fn new(
        corpus: Arc<Corpus>,
        embedder: Arc<dyn EmbeddingProvider>,
        extractor: QaExtractor,
        skip_sheets: usize,
    ) -> Self {
        Self {
            corpus,
            embedder,
            extractor,
            skip_sheets,
            write_lock: Mutex::new(()),
        }
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    /// Store QA records as `Q: ...\nA: ...`; incomplete records are dropped
    pub async fn ingest_records(&self, records: &[QaRecord]) -> Result<IngestOutcome> {
        let documents: Vec<String> = records.iter().filter_map(QaRecord::to_document).collect();
        self.ingest_documents(documents).await
    }

    /// Store each trimmed, non-empty paragraph as its own document
    pub async fn ingest_paragraphs<S: AsRef<str>>(&self, lines: &[S]) -> Result<IngestOutcome> {
        self.ingest_documents(paragraphs(lines)).await
    }

    /// Decode an upload and ingest it in the requested mode
    pub async fn ingest_file(
        &self,
        filename: &str,
        data: Vec<u8>,
        mode: IngestMode,
    ) -> Result<IngestOutcome> {
        mode.check(filename)?;

        let name = filename.to_string();
        let skip_sheets = self.skip_sheets;
        let content = tokio::task::spawn_blocking(move || FileParser::parse(&name, &data, skip_sheets))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

        match (mode, content) {
            (IngestMode::QaPairs, content) => {
                let records = super::extract_records(&self.extractor, &content);
                tracing::info!("Extracted {} QA records from {}", records.len(), filename);
                self.ingest_records(&records).await
            }
            (IngestMode::RawParagraphs, SourceContent::Lines(lines)) => {
                self.ingest_paragraphs(&lines).await
            }
            (IngestMode::RawParagraphs, SourceContent::Sheets(_)) => {
                Err(Error::UnsupportedFileType(format!("{} (raw mode)", filename)))
            }
        }
    }

    async fn ingest_documents(&self, documents: Vec<String>) -> Result<IngestOutcome> {
        let _guard = self.write_lock.lock().await;

        if documents.is_empty() {
            return Ok(IngestOutcome {
                documents_added: 0,
                total_documents: self.corpus.len(),
            });
        }

        let embeddings = self.embedder.embed_batch(&documents).await?;

        let corpus = Arc::clone(&self.corpus);
        let range = tokio::task::spawn_blocking(move || corpus.append(documents, embeddings))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

        tracing::info!(
            "Appended {} documents via {} (ordinals {}..{})",
            range.len(),
            self.embedder.name(),
            range.start,
            range.end
        );

        Ok(IngestOutcome {
            documents_added: range.len(),
            total_documents: range.end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Answer;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct LengthEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for LengthEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "length"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(Error::embedding("model unavailable"))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct YieldingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for YieldingEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut vectors = Vec::with_capacity(texts.len());
            for text in texts {
                tokio::task::yield_now().await;
                vectors.push(vec![text.len() as f32, 1.0]);
            }
            Ok(vectors)
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "yielding"
        }
    }

    fn coordinator(
        dir: &tempfile::TempDir,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> IngestionCoordinator {
        let corpus = Corpus::open(
            &dir.path().join("docs.json"),
            &dir.path().join("index.bin"),
            None,
        )
        .unwrap();
        IngestionCoordinator::new(Arc::new(corpus), embedder, QaExtractor::default(), 2)
    }

    #[tokio::test]
    async fn test_ingest_text_file_as_qa() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(LengthEmbedder { calls: AtomicUsize::new(0) });
        let coordinator = coordinator(&dir, embedder.clone());

        let outcome = coordinator
            .ingest_file(
                "faq.txt",
                b"What is the minimum balance?\nPKR 1,000 required\n".to_vec(),
                IngestMode::QaPairs,
            )
            .await
            .unwrap();

        assert_eq!(outcome.documents_added, 1);
        assert_eq!(outcome.total_documents, 1);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            coordinator.corpus().document(0).as_deref(),
            Some("Q: What is the minimum balance?\nA: PKR 1,000 required")
        );
    }

    #[tokio::test]
    async fn test_incomplete_records_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir, Arc::new(LengthEmbedder { calls: AtomicUsize::new(0) }));

        let records = vec![
            QaRecord::new("Is it free?", Answer::Text("Yes".to_string())),
            QaRecord::new("", Answer::Text("orphan".to_string())),
            QaRecord::new("Who?", Answer::Fragments(vec![])),
        ];
        let outcome = coordinator.ingest_records(&records).await.unwrap();
        assert_eq!(outcome.documents_added, 1);
    }

    #[tokio::test]
    async fn test_raw_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir, Arc::new(LengthEmbedder { calls: AtomicUsize::new(0) }));

        let outcome = coordinator
            .ingest_file("notes.txt", b"  First line \n\n\nSecond line\n".to_vec(), IngestMode::RawParagraphs)
            .await
            .unwrap();
        assert_eq!(outcome.documents_added, 2);
        assert_eq!(coordinator.corpus().document(1).as_deref(), Some("Second line"));
    }

    #[tokio::test]
    async fn test_nothing_to_ingest_skips_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(LengthEmbedder { calls: AtomicUsize::new(0) });
        let coordinator = coordinator(&dir, embedder.clone());

        let outcome = coordinator
            .ingest_file("empty.txt", b"\n  \n".to_vec(), IngestMode::QaPairs)
            .await
            .unwrap();
        assert_eq!(outcome.documents_added, 0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unsupported_type_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir, Arc::new(LengthEmbedder { calls: AtomicUsize::new(0) }));

        let err = coordinator
            .ingest_file("policy.docx", Vec::new(), IngestMode::QaPairs)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(_)));
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_corpus_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir, Arc::new(FailingEmbedder));

        let err = coordinator
            .ingest_paragraphs(&["one", "two"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert_eq!(coordinator.corpus().stats().documents, 0);
        assert_eq!(coordinator.corpus().stats().vectors, 0);
        assert!(!dir.path().join("docs.json").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ingestions_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(&dir, Arc::new(YieldingEmbedder));

        let batch = |prefix: &str, size: usize| -> Vec<String> {
            (0..size).map(|i| format!("{}-{}", prefix, i)).collect()
        };
        let (a, b, c) = (batch("a", 4), batch("b", 3), batch("c", 5));

        let (ra, rb, rc) = tokio::join!(
            coordinator.ingest_paragraphs(a.as_slice()),
            coordinator.ingest_paragraphs(b.as_slice()),
            coordinator.ingest_paragraphs(c.as_slice()),
        );
        assert_eq!(ra.unwrap().documents_added, 4);
        assert_eq!(rb.unwrap().documents_added, 3);
        assert_eq!(rc.unwrap().documents_added, 5);

        let stats = coordinator.corpus().stats();
        assert_eq!(stats.documents, 12);
        assert_eq!(stats.vectors, 12);

        let stored: Vec<String> = (0..12)
            .map(|i| coordinator.corpus().document(i).unwrap())
            .collect();
        for (prefix, expected) in [("a", &a), ("b", &b), ("c", &c)] {
            let ordinals: Vec<usize> = stored
                .iter()
                .enumerate()
                .filter(|(_, text)| text.starts_with(&format!("{}-", prefix)))
                .map(|(i, _)| i)
                .collect();
            assert_eq!(ordinals.len(), expected.len());
            let start = ordinals[0];
            assert_eq!(ordinals, (start..start + expected.len()).collect::<Vec<_>>());
            assert_eq!(&stored[start..start + expected.len()], expected.as_slice());
        }

        let reopened = Corpus::open(
            &dir.path().join("docs.json"),
            &dir.path().join("index.bin"),
            None,
        )
        .unwrap();
        assert_eq!(reopened.stats(), stats);
        for (i, text) in stored.iter().enumerate() {
            assert_eq!(reopened.document(i).as_ref(), Some(text));
        }
    }
}
