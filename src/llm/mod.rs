//! Text generation seam
//!
//! The language model is an external collaborator. `LlmClient` speaks to
//! Ollama, OpenAI-compatible chat endpoints and Gemini; everything above it
//! depends only on the `Generator` trait.

pub mod client;

use async_trait::async_trait;
pub use client::LlmClient;

use crate::config::AppConfig;
use crate::errors::Result;

/// Returned by the advisor when the model call fails
pub const FALLBACK_REPLY: &str =
    "I'm here to offer spiritual guidance. Could you please rephrase your question?";

/// Returned when the model answers with nothing usable
pub const EMPTY_REPLY_FALLBACK: &str = "I sense your question touches on deep spiritual matters. \
The wisdom traditions teach us to approach life with patience and compassion. \
Please share more about what guidance you seek.";

/// Placeholder for a single agent step that failed
pub const AGENT_FALLBACK: &str = "Seeking wisdom...";

/// One generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            prompt: prompt.into(),
            max_tokens: 2048,
            temperature: 0.7,
            top_p: 0.9,
        }
    }

    #[must_use]
    pub fn with_system(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub const fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// System and user prompt joined for providers with a single text input
    pub fn combined_prompt(&self) -> String {
        match &self.system_prompt {
            Some(system) if !system.is_empty() => format!("{system}\n\n{}", self.prompt),
            _ => self.prompt.clone(),
        }
    }
}

/// Turns a prompt into text
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// LLM client built from configuration, applying configured sampling values
pub struct LlmService {
    client: LlmClient,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

impl LlmService {
    /// Create a new LLM service
    ///
    /// # Errors
    /// - Malformed endpoint URL
    /// - HTTP client build errors
    pub fn new(config: &AppConfig) -> Result<Self> {
        let llm = &config.llm;
        let client = LlmClient::new(
            llm.provider,
            llm.endpoint.clone(),
            llm.model.clone(),
            llm.api_key.clone(),
            llm.timeout_secs,
        )?;
        Ok(Self {
            client,
            temperature: llm.temperature,
            top_p: llm.top_p,
            max_tokens: llm.max_tokens,
        })
    }

    pub fn client(&self) -> &LlmClient {
        &self.client
    }

    /// Configured temperature and top_p; the configured max_tokens caps each stage's budget
    fn with_configured_sampling(&self, request: &GenerationRequest) -> GenerationRequest {
        let max_tokens = request.max_tokens.min(self.max_tokens);
        request
            .clone()
            .with_temperature(self.temperature)
            .with_top_p(self.top_p)
            .with_max_tokens(max_tokens)
    }
}

#[async_trait]
impl Generator for LlmService {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let request = self.with_configured_sampling(request);
        self.client.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = GenerationRequest::new("What is patience?");
        assert_eq!(request.max_tokens, 2048);
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
        assert!((request.top_p - 0.9).abs() < f32::EPSILON);
        assert!(request.system_prompt.is_none());
    }

    #[test]
    fn test_combined_prompt() {
        let plain = GenerationRequest::new("question");
        assert_eq!(plain.combined_prompt(), "question");

        let with_system = GenerationRequest::new("question").with_system("be kind");
        assert_eq!(with_system.combined_prompt(), "be kind\n\nquestion");

        let empty_system = GenerationRequest::new("question").with_system("");
        assert_eq!(empty_system.combined_prompt(), "question");
    }

    #[test]
    fn test_service_from_default_config() {
        let service = LlmService::new(&AppConfig::default()).unwrap();
        assert_eq!(service.client().model(), "llama3");
    }

    #[test]
    fn test_configured_sampling_applied_to_every_request() {
        let mut config = AppConfig::default();
        config.llm.temperature = 0.2;
        config.llm.top_p = 0.5;
        config.llm.max_tokens = 1024;
        let service = LlmService::new(&config).unwrap();

        let stage = GenerationRequest::new("Summarize")
            .with_system("be brief")
            .with_max_tokens(256);
        let sent = service.with_configured_sampling(&stage);
        assert!((sent.temperature - 0.2).abs() < f32::EPSILON);
        assert!((sent.top_p - 0.5).abs() < f32::EPSILON);
        assert_eq!(sent.max_tokens, 256);
        assert_eq!(sent.system_prompt.as_deref(), Some("be brief"));

        let answer = GenerationRequest::new("Answer").with_max_tokens(2048);
        assert_eq!(service.with_configured_sampling(&answer).max_tokens, 1024);
    }
}
