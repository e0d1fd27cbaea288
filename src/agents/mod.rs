//! Remote assistant integration
//!
//! ## Architecture
//!
//! - `llm/` - Remote assistant service trait and the OpenAI Assistants client
//! - `core/` - Assistant lifecycle, run loop and tool-call dispatch
//! - `config` - Per-assistant configuration
//! - `error` - Error types

pub mod config;
pub mod core;
pub mod error;
pub mod llm;

// Re-export commonly used types
pub use config::*;
pub use error::*;
