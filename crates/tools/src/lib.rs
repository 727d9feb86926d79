//! Shop Agent tools library.
//!
//! Agent tools that create, read, update, delete, search, and bulk-update
//! Shopify products, filling in missing fields with text from Claude.
//!
//! # Security
//!
//! This crate contains HIGH PRIVILEGE access:
//! - Shopify Admin API (full product catalog management)
//! - Claude API (text generation)
//!
//! # Modules
//!
//! - [`config`] - Environment configuration with validated secrets
//! - [`claude`] - Anthropic Messages API client
//! - [`completion`] - The text completion seam used by the generator
//! - [`shopify`] - REST Admin API client and the [`shopify::ProductStore`] seam
//! - [`generator`] - Field resolution: literal, generated, or kept
//! - [`backup`] - Pre-change product snapshots
//! - [`tools`] - Tool definitions and the executor

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backup;
pub mod claude;
pub mod completion;
pub mod config;
pub mod error;
pub mod generator;
pub mod shopify;
pub mod tools;

pub use error::ToolError;
pub use tools::{ToolExecutor, ToolResponse};
