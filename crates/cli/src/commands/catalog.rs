//! Tool discovery commands.
//!
//! # Usage
//!
//! ```bash
//! shop-agent list-tools
//! shop-agent schema bulk_update_products
//! ```

use std::io::Write;

use shop_agent_tools::tools::{all_tools, get_tool_by_name};

use super::CliError;

/// Write one line per tool: name, confirmation marker, description.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn list_tools(out: &mut impl Write) -> Result<(), CliError> {
    for tool in all_tools() {
        let marker = if tool.requires_confirmation {
            " [confirm]"
        } else {
            ""
        };
        writeln!(out, "{}{marker}", tool.name)?;
        writeln!(out, "    {}", tool.description)?;
    }
    Ok(())
}

/// Write a tool's input schema as pretty JSON.
///
/// # Errors
///
/// Returns `CliError::UnknownTool` if no tool has that name.
pub fn schema(name: &str, out: &mut impl Write) -> Result<(), CliError> {
    let tool = get_tool_by_name(name).ok_or_else(|| CliError::UnknownTool(name.to_string()))?;
    let rendered = serde_json::to_string_pretty(&tool.input_schema)
        .map_err(|e| CliError::InvalidInput(e.to_string()))?;
    writeln!(out, "{rendered}")?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_list_marks_confirmation() {
        let mut out = Vec::new();
        list_tools(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("delete_product [confirm]\n"));
        assert!(text.contains("bulk_update_products [confirm]\n"));
        assert!(text.contains("get_product\n"));
    }

    #[test]
    fn test_schema() {
        let mut out = Vec::new();
        schema("update_product", &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["required"][0], "product_id");

        assert!(matches!(
            schema("drop_tables", &mut Vec::<u8>::new()),
            Err(CliError::UnknownTool(_))
        ));
    }
}
