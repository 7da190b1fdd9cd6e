//! LLM API clients for the supported providers

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::GenerationRequest;
use super::Generator;
use crate::config::LlmProvider;
use crate::errors::Result;
use crate::errors::WisdomError;

const OLLAMA_REPEAT_PENALTY: f32 = 1.1;

const GEMINI_SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Text of the first candidate, empty when Gemini returned none
fn gemini_text(response: GeminiResponse) -> String {
    let Some(candidate) = response.candidates.into_iter().next() else {
        warn!("Gemini returned no candidates");
        return String::new();
    };
    debug!(
        "Gemini finish reason: {}",
        candidate.finish_reason.as_deref().unwrap_or("N/A")
    );

    // Long answers are sometimes split across several parts
    candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default()
}

/// Client for text generation across providers
pub struct LlmClient {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl LlmClient {
    /// Create a new LLM client
    ///
    /// # Errors
    /// - Malformed endpoint URL
    /// - HTTP client build errors
    pub fn new(
        provider: LlmProvider,
        endpoint: String,
        model: String,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        url::Url::parse(&endpoint).map_err(|e| {
            WisdomError::ConfigError(format!("Invalid LLM endpoint '{endpoint}': {e}"))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| WisdomError::HttpError(e.to_string()))?;

        Ok(Self {
            provider,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            api_key,
            client,
        })
    }

    pub const fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn require_key(&self, provider: &str) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| WisdomError::ConfigError(format!("{provider} API key not provided")))
    }

    async fn generate_ollama(&self, request: &GenerationRequest) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaOptions {
            num_predict: u32,
            temperature: f32,
            top_p: f32,
            repeat_penalty: f32,
        }

        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: String,
            stream: bool,
            options: OllamaOptions,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            #[serde(default)]
            response: String,
        }

        let url = format!("{}/api/generate", self.endpoint);
        debug!("Calling Ollama generate API: {}", url);

        let body = OllamaRequest {
            model: &self.model,
            prompt: request.combined_prompt(),
            stream: false,
            options: OllamaOptions {
                num_predict: request.max_tokens,
                temperature: request.temperature,
                top_p: request.top_p,
                repeat_penalty: OLLAMA_REPEAT_PENALTY,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WisdomError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(WisdomError::LlmError(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| WisdomError::LlmError(format!("Failed to parse response: {e}")))?;
        Ok(result.response)
    }

    async fn generate_openai(&self, request: &GenerationRequest) -> Result<String> {
        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            max_tokens: u32,
            temperature: f32,
            top_p: f32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            #[serde(default)]
            content: Option<String>,
        }

        let api_key = self.require_key("OpenAI")?;
        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling OpenAI chat completions API with model {}", self.model);

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| WisdomError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(WisdomError::LlmError(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| WisdomError::LlmError(format!("Failed to parse response: {e}")))?;

        Ok(result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn generate_gemini(&self, request: &GenerationRequest) -> Result<String> {
        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            max_output_tokens: u32,
            temperature: f32,
            top_p: f32,
        }

        #[derive(Serialize)]
        struct SafetySetting {
            category: &'static str,
            threshold: &'static str,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GeminiRequest<'a> {
            contents: Vec<Content<'a>>,
            generation_config: GenerationConfig,
            safety_settings: Vec<SafetySetting>,
        }

        let api_key = self.require_key("Gemini")?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={api_key}",
            self.endpoint, self.model
        );
        debug!("Calling Gemini generateContent with model {}", self.model);

        let prompt = request.combined_prompt();
        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
                top_p: request.top_p,
            },
            safety_settings: GEMINI_SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WisdomError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(WisdomError::LlmError(format!(
                "Gemini API error ({status}): {error_text}"
            )));
        }

        let result: GeminiResponse = response
            .json()
            .await
            .map_err(|e| WisdomError::LlmError(format!("Failed to parse response: {e}")))?;

        let text = gemini_text(result);
        debug!("Gemini returned {} chars", text.len());
        Ok(text)
    }
}

#[async_trait]
impl Generator for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        match self.provider {
            LlmProvider::Ollama => self.generate_ollama(request).await,
            LlmProvider::OpenAi => self.generate_openai(request).await,
            LlmProvider::Gemini => self.generate_gemini(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(provider: LlmProvider, api_key: Option<&str>) -> LlmClient {
        LlmClient::new(
            provider,
            "http://localhost:11434/".to_string(),
            "llama3".to_string(),
            api_key.map(str::to_string),
            30,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_malformed_endpoint() {
        let result = LlmClient::new(
            LlmProvider::Ollama,
            "localhost without scheme".to_string(),
            "llama3".to_string(),
            None,
            30,
        );
        assert!(matches!(result, Err(WisdomError::ConfigError(_))));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = client(LlmProvider::Ollama, None);
        assert_eq!(client.endpoint, "http://localhost:11434");
        assert_eq!(client.provider(), LlmProvider::Ollama);
    }

    #[tokio::test]
    async fn test_hosted_providers_require_key() {
        let request = GenerationRequest::new("peace");
        for provider in [LlmProvider::OpenAi, LlmProvider::Gemini] {
            let result = client(provider, None).generate(&request).await;
            assert!(matches!(result, Err(WisdomError::ConfigError(_))));
            let result = client(provider, Some("")).generate(&request).await;
            assert!(matches!(result, Err(WisdomError::ConfigError(_))));
        }
    }

    #[test]
    fn test_gemini_text_joins_parts_of_first_candidate() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {
                    "content": {"parts": [{"text": "Peace "}, {}, {"text": "be with you."}]},
                    "finishReason": "STOP"
                },
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(gemini_text(response), "Peace be with you.");
    }

    #[test]
    fn test_gemini_text_without_content_is_empty() {
        let blocked: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert_eq!(gemini_text(blocked), "");

        let none: GeminiResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(gemini_text(none), "");
    }

    #[tokio::test]
    #[ignore = "Requires a running Ollama server"]
    async fn test_ollama_generate() {
        let request = GenerationRequest::new("Say one word about peace.").with_max_tokens(16);
        let text = client(LlmProvider::Ollama, None)
            .generate(&request)
            .await
            .unwrap();
        assert!(!text.is_empty());
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_gemini_generate() {
        let client = LlmClient::new(
            LlmProvider::Gemini,
            "https://generativelanguage.googleapis.com".to_string(),
            "gemini-1.5-flash".to_string(),
            std::env::var("GEMINI_API_KEY").ok(),
            60,
        )
        .unwrap();
        let request = GenerationRequest::new("Say one word about hope.")
            .with_system("Answer briefly.")
            .with_max_tokens(32);
        let text = client.generate(&request).await.unwrap();
        assert!(!text.is_empty());
    }
}
