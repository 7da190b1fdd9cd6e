//! Embeddings generation module
//!
//! Text embeddings come from an external model reachable over HTTP:
//! - OpenAI-compatible `/embeddings` endpoints (native batching)
//! - Ollama `/api/embeddings` (one request per text, run concurrently)
//!
//! # Examples
//!
//! ```rust,no_run
//! use wisdomrag::config::AppConfig;
//! use wisdomrag::embeddings::Embedder;
//! use wisdomrag::embeddings::EmbeddingService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config)?;
//!
//!     let embedding = service.embed("Be still, and know").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;

use async_trait::async_trait;
pub use client::EmbeddingClient;
pub use generator::EmbeddingService;

use crate::errors::Result;
use crate::errors::WisdomError;

/// Maximum texts sent in one provider request
pub const MAX_BATCH_SIZE: usize = 100;

/// Turns text into vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeddings in the same order as `texts`
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;
}

/// Collapse whitespace runs so line-wrapped scripture embeds like prose
pub fn preprocess_text(text: &str) -> Result<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(WisdomError::EmbeddingError(
            "Cannot embed empty text".to_string(),
        ));
    }
    Ok(collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_collapses_whitespace() {
        assert_eq!(
            preprocess_text("  In the beginning\n\nwas the   Word ").unwrap(),
            "In the beginning was the Word"
        );
    }

    #[test]
    fn test_preprocess_rejects_blank() {
        assert!(preprocess_text(" \t\n").is_err());
    }
}
