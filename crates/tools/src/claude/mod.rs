//! Claude API integration for generating product copy.
//!
//! # Features
//!
//! - Single-turn, non-streaming completions against the Anthropic Messages API
//! - Fixed copywriting system prompt
//! - Typed errors for rate limiting, authentication, and API failures
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_agent_tools::claude::ClaudeClient;
//!
//! let client = ClaudeClient::new(config.claude())?;
//! let reply = client.complete("Suggest a suitable vendor for a product with title Blue Widget.").await?;
//! ```

mod client;
mod error;
mod types;

pub use client::{ClaudeClient, SYSTEM_PROMPT};
pub use error::ClaudeError;
pub use types::{ChatRequest, ChatResponse, ContentBlock, Message, StopReason, Usage};
