//! CLI subcommands.

pub mod catalog;
pub mod run;

use shop_agent_tools::claude::ClaudeError;
use shop_agent_tools::config::ConfigError;
use shop_agent_tools::shopify::AdminShopifyError;
use thiserror::Error;

/// Errors that stop a command before or outside a tool run.
///
/// Tool failures are not errors here; they are printed like any other
/// tool output.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Configuration was not loaded")]
    MissingConfig,

    #[error("Failed to create Shopify client: {0}")]
    Store(#[from] AdminShopifyError),

    #[error("Failed to create Claude client: {0}")]
    Claude(#[from] ClaudeError),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool input must be a JSON object: {0}")]
    InvalidInput(String),

    #[error("{0} requires confirmation; pass --yes to run it")]
    ConfirmationRequired(String),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
