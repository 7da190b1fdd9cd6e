//! Passage retrieval over the vector store

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::models::ScoredPassage;
use crate::traditions;
use crate::vectorstore::SearchFilter;
use crate::vectorstore::VectorStore;

/// Default number of passages for a question
pub const DEFAULT_K: usize = 6;

/// Default passages per tradition in a comparison
pub const DEFAULT_K_PER_TRADITION: usize = 3;

/// Passages retrieved for one tradition
#[derive(Debug, Clone, Serialize)]
pub struct TraditionPassages {
    pub tradition: String,
    pub passages: Vec<ScoredPassage>,
}

/// Retriever embedding questions and searching the store
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Closest passages, restricted to `traditions` unless empty or "All Traditions"
    pub async fn retrieve<S: AsRef<str> + Sync>(
        &self,
        question: &str,
        traditions: &[S],
        k: usize,
    ) -> Result<Vec<ScoredPassage>> {
        debug!("Retrieving {} passages for: {}", k, question);
        let embedding = self.embedder.embed(question).await?;
        let filter = SearchFilter::traditions(traditions);
        let passages = self.store.search(&embedding, &filter, k).await?;
        debug!("Retrieved {} scripture passages", passages.len());
        Ok(passages)
    }

    /// Per-tradition retrieval in the order given
    ///
    /// Traditions with no hits, or whose search fails, are left out.
    pub async fn retrieve_comparative<S: AsRef<str> + Sync>(
        &self,
        question: &str,
        traditions: &[S],
        k_per_tradition: usize,
    ) -> Result<Vec<TraditionPassages>> {
        let embedding = self.embedder.embed(question).await?;

        let mut results = Vec::new();
        for tradition in traditions {
            let tradition = tradition.as_ref();
            let filter = SearchFilter::tradition(tradition);
            match self.store.search(&embedding, &filter, k_per_tradition).await {
                Ok(passages) if !passages.is_empty() => results.push(TraditionPassages {
                    tradition: tradition.to_string(),
                    passages,
                }),
                Ok(_) => debug!("No passages for {}", tradition),
                Err(e) => warn!("Comparative search for {} failed: {}", tradition, e),
            }
        }
        Ok(results)
    }

    /// Traditions present in the store, or the full catalog when that cannot be read
    pub async fn available_traditions(&self) -> Vec<String> {
        match self.store.traditions().await {
            Ok(found) if !found.is_empty() => found,
            Ok(_) => catalog_names(),
            Err(e) => {
                warn!("Could not list traditions in the store: {}", e);
                catalog_names()
            }
        }
    }
}

fn catalog_names() -> Vec<String> {
    traditions::names().into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::models::EmbeddedChunk;
    use crate::models::Passage;
    use crate::models::PassageMetadata;
    use crate::vectorstore::FlatStore;

    struct ConstantEmbedder;

    #[async_trait]
    impl Embedder for ConstantEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn chunk(id: &str, tradition: &str) -> EmbeddedChunk {
        EmbeddedChunk {
            id: id.to_string(),
            passage: Passage {
                content: format!("{tradition} teaching {id}"),
                metadata: PassageMetadata {
                    tradition: tradition.to_string(),
                    scripture_name: format!("{tradition} scripture"),
                    book_title: id.to_string(),
                    source_file: format!("{id}.txt"),
                    chunk_index: 0,
                },
            },
            embedding: vec![1.0, 0.0],
        }
    }

    async fn retriever() -> Retriever {
        let store = FlatStore::in_memory();
        store
            .add(vec![
                chunk("a", "Buddhism"),
                chunk("b", "Buddhism"),
                chunk("c", "Islam"),
            ])
            .await
            .unwrap();
        Retriever::new(Arc::new(ConstantEmbedder), Arc::new(store))
    }

    #[tokio::test]
    async fn test_retrieve_with_and_without_filter() {
        let retriever = retriever().await;
        let none: [&str; 0] = [];
        assert_eq!(retriever.retrieve("peace", &none, 6).await.unwrap().len(), 3);
        let islam = retriever.retrieve("peace", &["Islam"], 6).await.unwrap();
        assert_eq!(islam.len(), 1);
        assert_eq!(islam[0].passage.tradition(), "Islam");
        let all = retriever
            .retrieve("peace", &["Islam", "All Traditions"], 6)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_comparative_skips_empty_traditions() {
        let retriever = retriever().await;
        let results = retriever
            .retrieve_comparative("suffering", &["Buddhism", "Taoism", "Islam"], 3)
            .await
            .unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.tradition.as_str()).collect();
        assert_eq!(names, vec!["Buddhism", "Islam"]);
        assert_eq!(results[0].passages.len(), 2);
    }

    #[tokio::test]
    async fn test_available_traditions() {
        let retriever = retriever().await;
        assert_eq!(
            retriever.available_traditions().await,
            vec!["Buddhism".to_string(), "Islam".to_string()]
        );

        let empty = Retriever::new(Arc::new(ConstantEmbedder), Arc::new(FlatStore::in_memory()));
        assert_eq!(empty.available_traditions().await.len(), traditions::all().len());
    }
}
