//! Retrieval-augmented spiritual guidance
//!
//! A question is screened by [`crate::safety`], matched against scripture
//! passages in the vector store, and answered by the configured LLM with the
//! passages, the seeker's memory and recent history in the prompt.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use wisdomrag::config::AppConfig;
//! use wisdomrag::embeddings::EmbeddingService;
//! use wisdomrag::llm::LlmService;
//! use wisdomrag::rag::Advisor;
//! use wisdomrag::rag::AskRequest;
//! use wisdomrag::rag::Retriever;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let store = wisdomrag::vectorstore::open(&config).await?;
//!     let retriever = Retriever::new(Arc::new(EmbeddingService::new(&config)?), store);
//!     let advisor = Advisor::new(
//!         retriever,
//!         Arc::new(LlmService::new(&config)?),
//!         config.advisor.clone(),
//!     );
//!
//!     let answer = advisor.ask(AskRequest::new("How do I forgive?")).await?;
//!     println!("{}", answer.response);
//!     Ok(())
//! }
//! ```

pub mod advisor;
pub mod agents;
pub mod comparison;
pub mod context;
pub mod prompts;
pub mod retriever;

pub use advisor::Advisor;
pub use advisor::AskRequest;
pub use advisor::AskResponse;
pub use advisor::DailyWisdom;
pub use agents::AgentOutputs;
pub use agents::AgentPipeline;
pub use comparison::detect_comparison_request;
pub use comparison::ComparisonRequest;
pub use context::context_to_text;
pub use retriever::Retriever;
pub use retriever::TraditionPassages;
