use std::sync::Arc;

use async_trait::async_trait;
use wisdomrag::embeddings::Embedder;
use wisdomrag::ingest::Indexer;
use wisdomrag::ingest::TextSplitter;
use wisdomrag::rag::Retriever;
use wisdomrag::vectorstore::FlatStore;
use wisdomrag::vectorstore::VectorStore;
use wisdomrag::Result;

/// Embeds text as counts of a few keywords so search is meaningful
struct KeywordEmbedder;

const KEYWORDS: [&str; 3] = ["mercy", "way", "mind"];

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        Ok(KEYWORDS
            .iter()
            .map(|k| lower.matches(k).count() as f32 + 0.01)
            .collect())
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize {
        KEYWORDS.len()
    }
}

const QURAN: &str = "In the name of God, the Compassionate, the Merciful. Mercy upon mercy.\n\n\
Praise be to God, Lord of the worlds, the compassionate, full of mercy.\n";

const TAO: &str = "The way that can be told is not the eternal way.\n\n\
The name that can be named is not the eternal name. Follow the way.\n";

const ANALECTS: &str = "The Master said: set your mind on the good.\n\n\
A quiet mind learns; a restless mind forgets.\n";

fn write_raw_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("quran.txt"), QURAN).unwrap();
    std::fs::write(dir.path().join("tao_te_ching.txt"), TAO).unwrap();
    std::fs::write(dir.path().join("analects.txt"), ANALECTS).unwrap();
    std::fs::write(dir.path().join("README.md"), "not a scripture").unwrap();
    dir
}

#[tokio::test]
async fn test_index_then_retrieve_by_tradition() {
    let raw = write_raw_dir();
    let store: Arc<dyn VectorStore> = Arc::new(FlatStore::in_memory());

    let stats = Indexer::new(Arc::new(KeywordEmbedder), store.clone())
        .with_splitter(TextSplitter::new(80, 10))
        .with_batch_size(2)
        .build(raw.path())
        .await
        .unwrap();

    assert_eq!(stats.documents, 3);
    assert!(stats.chunks >= 3);
    assert_eq!(store.count().await.unwrap(), stats.chunks);
    assert!(stats.traditions.contains_key("Islam"));
    assert!(stats.traditions.contains_key("Confucianism"));

    let retriever = Retriever::new(Arc::new(KeywordEmbedder), store);
    let hits = retriever
        .retrieve("show me mercy", &["Islam"], 3)
        .await
        .unwrap();
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|h| h.passage.tradition() == "Islam"));
    assert_eq!(hits[0].passage.scripture(), "Quran");

    let hits = retriever
        .retrieve::<&str>("the eternal way", &[], 1)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].passage.content.contains("way"));
}

#[tokio::test]
async fn test_reindex_replaces_rather_than_duplicates() {
    let raw = write_raw_dir();
    let index_path = raw.path().join("index").join("passages.json");

    let store = Arc::new(FlatStore::open(&index_path).await.unwrap());
    let indexer = Indexer::new(Arc::new(KeywordEmbedder), store.clone());
    let first = indexer.build(raw.path()).await.unwrap();
    let second = indexer.build(raw.path()).await.unwrap();
    assert_eq!(first.chunks, second.chunks);
    assert_eq!(store.count().await.unwrap(), first.chunks);

    let reopened = FlatStore::open(&index_path).await.unwrap();
    assert_eq!(reopened.count().await.unwrap(), first.chunks);
}

#[tokio::test]
async fn test_missing_raw_dir_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn VectorStore> = Arc::new(FlatStore::in_memory());
    let result = Indexer::new(Arc::new(KeywordEmbedder), store)
        .build(&dir.path().join("missing"))
        .await;
    assert!(result.is_err());
}
