//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - data: Scripture download and indexing
//! - guidance: Questions, comparisons, daily wisdom and journaling
//! - info: Information display (traditions, config)
//! - serve: API server

pub mod data;
pub mod guidance;
pub mod info;
pub mod serve;

// Re-export all public handlers
pub use data::*;
pub use guidance::*;
pub use info::*;
pub use serve::*;
