//! Vector store seam
//!
//! The similarity index is an external collaborator. `PgVectorStore` talks to
//! PostgreSQL with the pgvector extension; `FlatStore` keeps everything in
//! process and persists to a JSON file, which is enough for local use and
//! tests.

pub mod flat;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
pub use self::flat::FlatStore;
pub use self::postgres::PgVectorStore;
use tracing::info;

use crate::config::AppConfig;
use crate::config::VectorBackend;
use crate::errors::Result;
use crate::errors::WisdomError;
use crate::models::EmbeddedChunk;
use crate::models::Passage;
use crate::models::ScoredPassage;
use crate::traditions::ALL_TRADITIONS;

/// Metadata restriction applied to a similarity search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub traditions: Vec<String>,
    pub book: Option<String>,
}

impl SearchFilter {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn traditions<S: AsRef<str>>(traditions: &[S]) -> Self {
        Self {
            traditions: traditions.iter().map(|t| t.as_ref().to_string()).collect(),
            book: None,
        }
    }

    pub fn tradition(tradition: &str) -> Self {
        Self::traditions(&[tradition])
    }

    /// Effective tradition restriction; `None` means every tradition
    pub fn tradition_set(&self) -> Option<&[String]> {
        if self.traditions.is_empty() || self.traditions.iter().any(|t| t == ALL_TRADITIONS) {
            None
        } else {
            Some(&self.traditions)
        }
    }

    pub fn matches(&self, passage: &Passage) -> bool {
        let tradition_ok = self
            .tradition_set()
            .map_or(true, |set| set.iter().any(|t| *t == passage.metadata.tradition));
        let book_ok = self
            .book
            .as_ref()
            .map_or(true, |book| *book == passage.metadata.book_title);
        tradition_ok && book_ok
    }
}

/// Similarity search over embedded scripture chunks
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks, replacing any with the same id
    async fn add(&self, chunks: Vec<EmbeddedChunk>) -> Result<usize>;

    /// The `k` passages closest to `embedding` that satisfy `filter`, best first
    async fn search(
        &self,
        embedding: &[f32],
        filter: &SearchFilter,
        k: usize,
    ) -> Result<Vec<ScoredPassage>>;

    async fn count(&self) -> Result<usize>;

    /// Distinct traditions present in the store, sorted
    async fn traditions(&self) -> Result<Vec<String>>;

    async fn clear(&self) -> Result<()>;

    /// Flush to durable storage where the backend needs it
    async fn persist(&self) -> Result<()> {
        Ok(())
    }
}

/// Open the backend named in the configuration
pub async fn open(config: &AppConfig) -> Result<Arc<dyn VectorStore>> {
    let settings = &config.vector_store;
    match settings.backend {
        VectorBackend::Memory => {
            info!("Opening flat vector store at {}", settings.path.display());
            let store = FlatStore::open(&settings.path).await?;
            Ok(Arc::new(store))
        }
        VectorBackend::PgVector => {
            let url = settings.database_url.as_deref().ok_or_else(|| {
                WisdomError::ConfigError(
                    "vector_store.database_url is required for the pgvector backend".to_string(),
                )
            })?;
            info!("Connecting to pgvector table {}", settings.table);
            let store = PgVectorStore::connect(
                url,
                &settings.table,
                config.embeddings.dimension,
                settings.max_connections,
            )
            .await?;
            Ok(Arc::new(store))
        }
    }
}

/// Cosine similarity; zero when either vector has no magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}
