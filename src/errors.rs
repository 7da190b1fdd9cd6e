use thiserror::Error;

#[derive(Error, Debug)]
pub enum WisdomError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] std::num::ParseIntError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Vector store error: {0}")]
    VectorStoreError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("{0}")]
    AuthError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Custom(String),
}

impl WisdomError {
    /// Whether the error was caused by the caller rather than the service.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AuthError(_) | Self::NotFound(_) | Self::InvalidInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WisdomError>;
