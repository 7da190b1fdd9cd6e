//! Embedding generation service with preprocessing and batching

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::client::EmbeddingClient;
use super::preprocess_text;
use super::Embedder;
use super::MAX_BATCH_SIZE;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::WisdomError;

/// Service for generating embeddings from configuration
pub struct EmbeddingService {
    client: Arc<EmbeddingClient>,
    dimension: usize,
}

impl EmbeddingService {
    /// Create a new embedding service
    pub fn new(config: &AppConfig) -> Result<Self> {
        let embeddings = &config.embeddings;
        let client = EmbeddingClient::new(
            embeddings.provider,
            embeddings.model.clone(),
            embeddings.endpoint.clone(),
            embeddings.api_key.clone(),
        )?;

        Ok(Self {
            client: Arc::new(client),
            dimension: embeddings.dimension,
        })
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() == self.dimension {
            Ok(())
        } else {
            Err(WisdomError::EmbeddingError(format!(
                "Embedding dimension mismatch: expected {}, got {} (model {})",
                self.dimension,
                embedding.len(),
                self.client.model()
            )))
        }
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let processed = preprocess_text(text)?;
        let embedding = self.client.generate(&processed).await?;
        self.check_dimension(&embedding)?;
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let processed = texts
            .iter()
            .map(|t| preprocess_text(t))
            .collect::<Result<Vec<_>>>()?;

        let mut embeddings = Vec::with_capacity(processed.len());
        for batch in processed.chunks(MAX_BATCH_SIZE) {
            debug!("Embedding batch of {} texts", batch.len());
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            let generated = self.client.generate_batch(&refs).await?;
            for embedding in &generated {
                self.check_dimension(embedding)?;
            }
            embeddings.extend(generated);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_check() {
        let service = EmbeddingService::new(&AppConfig::default()).unwrap();
        assert_eq!(service.dimension(), 768);
        assert!(service.check_dimension(&vec![0.0; 768]).is_ok());
        assert!(matches!(
            service.check_dimension(&[0.0; 3]),
            Err(WisdomError::EmbeddingError(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_text_rejected_before_request() {
        let service = EmbeddingService::new(&AppConfig::default()).unwrap();
        assert!(service.embed("   \n ").await.is_err());
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn test_ollama_batch_future_is_send_and_reports_errors() {
        let mut config = AppConfig::default();
        // Nothing listens on the discard port
        config.embeddings.endpoint = "http://127.0.0.1:9".to_string();
        let service = EmbeddingService::new(&config).unwrap();

        let texts = vec!["Be still".to_string(), "and know".to_string()];
        let pending = service.embed_batch(&texts);
        assert_send(&pending);
        assert!(pending.await.is_err());
    }
}
