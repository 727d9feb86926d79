//! Shop Agent Core - Product model and field pipeline.
//!
//! This crate provides the pieces shared by the Shop Agent crates:
//! - `shop-agent-tools` - Agent tools that talk to Shopify and the language model
//! - `shop-agent-cli` - Command-line host for running tools by name
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Generated text enters through [`normalize`], is checked by
//! [`validate`], and leaves through [`format`].
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, and the product model
//! - [`draft`] - The per-invocation attribute set and overflow notes
//! - [`normalize`] - Title casing, HTML paragraphs, tag and type trimming
//! - [`validate`] - Per-field constraints and product-level validation
//! - [`format`] - Human-readable product reports and tables

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod draft;
pub mod format;
pub mod normalize;
pub mod types;
pub mod validate;

pub use draft::{GenerationOutcome, OverflowNote, ProductDraft, ProductField};
pub use format::{ListColumn, SortOrder};
pub use types::*;
pub use validate::{DraftMode, FieldKind, ValidatedDraft, ValidationError, ValidationReason};
