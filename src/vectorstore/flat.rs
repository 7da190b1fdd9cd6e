//! In-process vector store persisted as JSON

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::cosine_similarity;
use super::SearchFilter;
use super::VectorStore;
use crate::errors::Result;
use crate::models::EmbeddedChunk;
use crate::models::ScoredPassage;

/// Brute-force cosine search over every stored chunk
pub struct FlatStore {
    path: Option<PathBuf>,
    chunks: RwLock<Vec<EmbeddedChunk>>,
}

impl FlatStore {
    /// A store that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            path: None,
            chunks: RwLock::new(Vec::new()),
        }
    }

    /// Load the store from `path`, starting empty when the file does not exist
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let chunks = if tokio::fs::try_exists(&path).await? {
            let bytes = tokio::fs::read(&path).await?;
            let chunks: Vec<EmbeddedChunk> = serde_json::from_slice(&bytes)?;
            info!("Loaded {} chunks from {}", chunks.len(), path.display());
            chunks
        } else {
            warn!(
                "Vector store file {} not found, starting empty",
                path.display()
            );
            Vec::new()
        };

        Ok(Self {
            path: Some(path),
            chunks: RwLock::new(chunks),
        })
    }
}

#[async_trait]
impl VectorStore for FlatStore {
    async fn add(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize> {
        let added = chunks.len();
        let mut stored = self.chunks.write().await;
        let incoming: BTreeSet<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        stored.retain(|c| !incoming.contains(c.id.as_str()));
        stored.extend(chunks);
        debug!("Flat store now holds {} chunks", stored.len());
        Ok(added)
    }

    async fn search(
        &self,
        embedding: &[f32],
        filter: &SearchFilter,
        k: usize,
    ) -> Result<Vec<ScoredPassage>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let stored = self.chunks.read().await;
        let mut scored: Vec<ScoredPassage> = stored
            .iter()
            .filter(|c| filter.matches(&c.passage))
            .map(|c| ScoredPassage {
                passage: c.passage.clone(),
                score: cosine_similarity(embedding, &c.embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.chunks.read().await.len())
    }

    async fn traditions(&self) -> Result<Vec<String>> {
        let stored = self.chunks.read().await;
        let set: BTreeSet<&str> = stored
            .iter()
            .map(|c| c.passage.metadata.tradition.as_str())
            .collect();
        Ok(set.into_iter().map(str::to_string).collect())
    }

    async fn clear(&self) -> Result<()> {
        self.chunks.write().await.clear();
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = {
            let stored = self.chunks.read().await;
            serde_json::to_vec(&*stored)?
        };
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        info!("Persisted vector store to {}", path.display());
        Ok(())
    }
}
