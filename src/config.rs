use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::WisdomError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the raw scripture `.txt` files
    pub raw_dir: PathBuf,
    /// Directory for per-user memory, accounts and community profiles
    pub user_data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            user_data_dir: PathBuf::from("data/users"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    OpenAi,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: EmbeddingProvider,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,
}

fn default_embedding_provider() -> EmbeddingProvider {
    EmbeddingProvider::Ollama
}

fn default_embedding_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_dimension() -> usize {
    768
}

fn default_embedding_batch_size() -> usize {
    32
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            endpoint: default_embedding_endpoint(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            api_key: None,
            batch_size: default_embedding_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    Memory,
    PgVector,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default = "default_vector_backend")]
    pub backend: VectorBackend,
    /// JSON file used by the in-process backend
    #[serde(default = "default_vector_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_vector_table")]
    pub table: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_vector_backend() -> VectorBackend {
    VectorBackend::Memory
}

fn default_vector_path() -> PathBuf {
    PathBuf::from("vectorstore/passages.json")
}

fn default_vector_table() -> String {
    "scripture_chunks".to_string()
}

fn default_max_connections() -> u32 {
    10
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: default_vector_backend(),
            path: default_vector_path(),
            database_url: None,
            table: default_vector_table(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Ollama,
    OpenAi,
    Gemini,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: LlmProvider,
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_provider() -> LlmProvider {
    LlmProvider::Ollama
}

fn default_llm_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3".to_string()
}

pub(crate) fn default_temperature() -> f32 {
    0.7
}

pub(crate) fn default_top_p() -> f32 {
    0.9
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: None,
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default = "default_advisor_name")]
    pub name: String,
    #[serde(default = "default_advisor_greeting")]
    pub greeting: String,
    #[serde(default = "default_true")]
    pub enable_crisis_detection: bool,
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,
}

fn default_advisor_name() -> String {
    "the Divine Wisdom Guide".to_string()
}

fn default_advisor_greeting() -> String {
    "Welcome, dear seeker. I am here to share the wisdom of the world's sacred traditions. \
     What weighs on your heart today?"
        .to_string()
}

fn default_true() -> bool {
    true
}

fn default_retrieval_k() -> usize {
    6
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            name: default_advisor_name(),
            greeting: default_advisor_greeting(),
            enable_crisis_detection: true,
            retrieval_k: default_retrieval_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub cors: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: true,
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

fn default_session_ttl_days() -> i64 {
    7
}

fn default_min_password_len() -> usize {
    6
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: default_session_ttl_days(),
            min_password_len: default_min_password_len(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            eprintln!(
                "Warning: Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(WisdomError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Secrets can be kept out of the file and supplied through the environment
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("WISDOMRAG_LLM_API_KEY") {
            if !key.is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var("WISDOMRAG_EMBEDDINGS_API_KEY") {
            if !key.is_empty() {
                self.embeddings.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("WISDOMRAG_DATABASE_URL") {
            if !url.is_empty() {
                self.vector_store.database_url = Some(url);
            }
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.embeddings.dimension == 0 {
            return Err(WisdomError::ConfigError(
                "embeddings.dimension must be greater than zero".to_string(),
            ));
        }
        if self.embeddings.model.trim().is_empty() {
            return Err(WisdomError::ConfigError(
                "embeddings.model must not be empty".to_string(),
            ));
        }
        if self.embeddings.batch_size == 0 {
            return Err(WisdomError::ConfigError(
                "embeddings.batch_size must be greater than zero".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(WisdomError::ConfigError(
                "llm.model must not be empty".to_string(),
            ));
        }
        if self.vector_store.backend == VectorBackend::PgVector
            && self
                .vector_store
                .database_url
                .as_deref()
                .map_or(true, |url| url.trim().is_empty())
        {
            return Err(WisdomError::ConfigError(
                "vector_store.database_url is required for the pgvector backend".to_string(),
            ));
        }
        if self.auth.session_ttl_days <= 0 {
            return Err(WisdomError::ConfigError(
                "auth.session_ttl_days must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.endpoint
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.model
    }

    pub fn advisor_name(&self) -> &str {
        &self.advisor.name
    }

    pub fn raw_dir(&self) -> &Path {
        &self.data.raw_dir
    }

    pub fn user_data_dir(&self) -> &Path {
        &self.data.user_data_dir
    }

    pub fn memory_dir(&self) -> PathBuf {
        self.data.user_data_dir.join("memory")
    }

    pub fn accounts_dir(&self) -> PathBuf {
        self.data.user_data_dir.join("accounts")
    }

    pub fn community_dir(&self) -> PathBuf {
        self.data.user_data_dir.join("community")
    }
}
