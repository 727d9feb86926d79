//! Run a single tool against the configured store.

use shop_agent_tools::backup::FileResourceWriter;
use shop_agent_tools::claude::ClaudeClient;
use shop_agent_tools::config::ToolsConfig;
use shop_agent_tools::shopify::AdminClient;
use shop_agent_tools::tools::{get_tool_by_name, requires_confirmation};
use shop_agent_tools::{ToolExecutor, ToolResponse};
use tracing::{info, instrument};

use super::CliError;

/// Parse `--input` into a JSON object.
///
/// # Errors
///
/// Returns `CliError::InvalidInput` for malformed JSON or non-object values.
pub fn parse_tool_input(raw: &str) -> Result<serde_json::Value, CliError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(CliError::InvalidInput(format!("got {value}")))
    }
}

/// Refuse unknown tools, and confirmation-gated tools without `--yes`.
///
/// # Errors
///
/// Returns `CliError::UnknownTool` or `CliError::ConfirmationRequired`.
pub fn check_allowed(name: &str, confirmed: bool) -> Result<(), CliError> {
    if get_tool_by_name(name).is_none() {
        return Err(CliError::UnknownTool(name.to_string()));
    }
    if requires_confirmation(name) && !confirmed {
        return Err(CliError::ConfirmationRequired(name.to_string()));
    }
    Ok(())
}

/// Build the clients from configuration and run one tool.
///
/// # Errors
///
/// Returns an error if the tool may not run or a client cannot be built.
/// Tool failures come back as a `ToolResponse` with `is_error` set.
#[instrument(skip(config, input))]
pub async fn run_tool(
    config: &ToolsConfig,
    name: &str,
    input: &serde_json::Value,
    confirmed: bool,
) -> Result<ToolResponse, CliError> {
    check_allowed(name, confirmed)?;

    let store = AdminClient::new(config.shopify())?;
    let completer = ClaudeClient::new(config.claude())?;
    let writer = FileResourceWriter::new(config.backup_dir.clone());
    info!(store = %config.shopify().store, "Running tool");

    let executor = ToolExecutor::new(&store, &completer, &writer);
    Ok(executor.run(name, input).await)
}
