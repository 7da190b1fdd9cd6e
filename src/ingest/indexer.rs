//! Batch indexing: load, chunk, embed, store

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use super::loader::load_books;
use super::loader::SourceDocument;
use super::splitter::TextSplitter;
use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::errors::WisdomError;
use crate::models::EmbeddedChunk;
use crate::models::Passage;
use crate::vectorstore::VectorStore;

/// Summary of an indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: usize,
    pub chunks: usize,
    /// Chunk count per tradition
    pub traditions: BTreeMap<String, usize>,
}

/// Stable id so re-indexing a file replaces its chunks
pub fn chunk_id(passage: &Passage) -> String {
    format!(
        "{}#{}",
        passage.metadata.source_file, passage.metadata.chunk_index
    )
}

pub struct Indexer {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    splitter: TextSplitter,
    batch_size: usize,
}

impl Indexer {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            splitter: TextSplitter::default(),
            batch_size: 32,
        }
    }

    #[must_use]
    pub fn with_splitter(mut self, splitter: TextSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Index every scripture file in `dir`
    pub async fn build(&self, dir: &Path) -> Result<IndexStats> {
        info!("Loading books from {}", dir.display());
        let dir = dir.to_path_buf();
        let docs = tokio::task::spawn_blocking(move || load_books(&dir))
            .await
            .map_err(|e| WisdomError::Custom(format!("Loader task failed: {e}")))??;
        self.index_documents(&docs).await
    }

    pub async fn index_documents(&self, docs: &[SourceDocument]) -> Result<IndexStats> {
        let start = Instant::now();
        let passages = self.splitter.split_documents(docs);
        info!(
            "Created {} chunks from {} documents",
            passages.len(),
            docs.len()
        );

        let mut stats = IndexStats {
            documents: docs.len(),
            ..IndexStats::default()
        };

        let total_batches = passages.len().div_ceil(self.batch_size);
        for (batch_no, batch) in passages.chunks(self.batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|p| p.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            let chunks: Vec<EmbeddedChunk> = batch
                .iter()
                .cloned()
                .zip(embeddings)
                .map(|(passage, embedding)| EmbeddedChunk {
                    id: chunk_id(&passage),
                    passage,
                    embedding,
                })
                .collect();

            for chunk in &chunks {
                *stats
                    .traditions
                    .entry(chunk.passage.metadata.tradition.clone())
                    .or_insert(0) += 1;
            }
            stats.chunks += self.store.add(chunks).await?;

            if (batch_no + 1) % 10 == 0 || batch_no + 1 == total_batches {
                info!(
                    "Embedded batch {}/{} ({} chunks so far)",
                    batch_no + 1,
                    total_batches,
                    stats.chunks
                );
            }
        }

        self.store.persist().await?;
        info!(
            "Indexed {} chunks in {:.1}s",
            stats.chunks,
            start.elapsed().as_secs_f64()
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::vectorstore::FlatStore;

    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_index_documents_counts_per_tradition() {
        let store = Arc::new(FlatStore::in_memory());
        let indexer = Indexer::new(Arc::new(LengthEmbedder), store.clone())
            .with_splitter(TextSplitter::new(40, 0))
            .with_batch_size(1);

        let docs = vec![
            SourceDocument::from_file_name(
                "tao_te_ching.txt",
                "The Tao that can be told.\n\nIs not the eternal Tao.".to_string(),
            ),
            SourceDocument::from_file_name("quran.txt", "In the name of God.".to_string()),
        ];
        let stats = indexer.index_documents(&docs).await.unwrap();

        assert_eq!(stats.documents, 2);
        assert_eq!(stats.chunks, 3);
        assert_eq!(stats.traditions.get("Taoism"), Some(&2));
        assert_eq!(stats.traditions.get("Islam"), Some(&1));
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_reindexing_replaces_chunks() {
        let store = Arc::new(FlatStore::in_memory());
        let indexer = Indexer::new(Arc::new(LengthEmbedder), store.clone());
        let docs = vec![SourceDocument::from_file_name(
            "analects.txt",
            "The Master said".to_string(),
        )];
        indexer.index_documents(&docs).await.unwrap();
        indexer.index_documents(&docs).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[test]
    fn test_chunk_id() {
        let mut doc = SourceDocument::from_file_name("quran.txt", "x".to_string());
        doc.metadata.chunk_index = 4;
        let passage = Passage {
            content: "x".to_string(),
            metadata: doc.metadata,
        };
        assert_eq!(chunk_id(&passage), "quran.txt#4");
    }
}
