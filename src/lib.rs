//! wisdomrag: retrieval-augmented spiritual guidance over public-domain scriptures
//!
//! Scripture texts are downloaded and split into passages ([`ingest`]),
//! embedded ([`embeddings`]) and stored ([`vectorstore`]). The [`rag`]
//! advisor retrieves passages for a question and asks an LLM ([`llm`])
//! to answer from them. Per-seeker memory, accounts and the community
//! layer back the HTTP API in [`api`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod community;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod memory;
pub mod models;
pub mod rag;
pub mod safety;
pub mod search;
pub mod text;
pub mod traditions;
pub mod vectorstore;


pub use config::AppConfig;
pub use errors::*;
