//! Tool registry and dispatch tests.

use serde_json::json;
use shop_agent_integration_tests::TestContext;
use shop_agent_tools::tools::{all_tools, get_tool_by_name, get_tool_names, requires_confirmation};

// =============================================================================
// Tool Registry Tests
// =============================================================================

#[test]
fn test_all_tools_registered() {
    let tools = all_tools();
    assert_eq!(
        get_tool_names(&tools),
        vec![
            "create_product",
            "update_product",
            "bulk_update_products",
            "delete_product",
            "get_product",
            "get_all_product_data",
            "get_all_products",
            "search_products",
        ]
    );
}

#[test]
fn test_read_tools_dont_require_confirmation() {
    for tool_name in [
        "get_product",
        "get_all_product_data",
        "get_all_products",
        "search_products",
        "create_product",
        "update_product",
    ] {
        assert!(
            !requires_confirmation(tool_name),
            "{tool_name} should not require confirmation"
        );
    }
}

#[test]
fn test_destructive_tools_require_confirmation() {
    for tool_name in ["delete_product", "bulk_update_products"] {
        assert!(
            requires_confirmation(tool_name),
            "{tool_name} should require confirmation"
        );
    }
}

#[test]
fn test_required_arguments() {
    let required = |name: &str| {
        get_tool_by_name(name).map(|tool| tool.input_schema["required"].clone())
    };
    assert_eq!(required("update_product"), Some(json!(["product_id"])));
    assert_eq!(required("delete_product"), Some(json!(["product_id"])));
    assert_eq!(required("get_product"), Some(json!(["product_identifier"])));
    assert_eq!(required("bulk_update_products"), Some(json!(["search_criteria"])));
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[tokio::test]
async fn test_unknown_tool_is_an_error_response() {
    let ctx = TestContext::default();

    let response = ctx.run("drop_tables", json!({})).await;

    assert!(response.is_error);
    assert_eq!(response.content, "Invalid input: Unknown tool: drop_tables");
}

#[tokio::test]
async fn test_malformed_input_is_an_error_response() {
    let ctx = TestContext::default();

    let response = ctx.run("get_product", json!({"product_identifier": ["a"]})).await;

    assert!(response.is_error);
    assert!(response.content.starts_with("Invalid input: "));
}
