//! End-to-end tests for `update_product` and `bulk_update_products`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use serde_json::json;
use shop_agent_core::{Price, ProductId};
use shop_agent_integration_tests::{InMemoryStore, TestContext, product};

fn catalog() -> InMemoryStore {
    InMemoryStore::with_products([
        product("Blue Widget", "Widget", "Acme", "blue, summer", "10.00"),
        product("Red Widget", "Widget", "Acme", "red", "12.00"),
        product("Green Gadget", "Gadget", "Globex", "green, summer", "30.00"),
    ])
}

// =============================================================================
// update_product
// =============================================================================

#[tokio::test]
async fn test_update_with_supplied_value() {
    let ctx = TestContext::new(catalog(), &[]);

    let response = ctx
        .run("update_product", json!({"product_id": "1001", "vendor": "Initech"}))
        .await;

    assert!(!response.is_error, "{}", response.content);
    assert!(response.content.contains("Vendor: Initech"));
    assert!(response.content.contains("Title: Blue Widget"));
    assert_eq!(ctx.completer.calls(), 0);

    let stored = ctx.store.product(ProductId::new(1001)).unwrap();
    assert_eq!(stored.vendor, "Initech");
    assert_eq!(stored.product_type, "Widget");
}

#[tokio::test]
async fn test_update_backs_up_previous_state() {
    let ctx = TestContext::new(catalog(), &[]);

    let response = ctx
        .run("update_product", json!({"product_id": 1001, "title": "Navy Widget"}))
        .await;
    assert!(!response.is_error, "{}", response.content);

    let files = ctx.writer.files();
    assert_eq!(files.len(), 1);
    let (name, contents) = files.iter().next().unwrap();
    assert!(name.starts_with("product_1001_update_"));
    assert!(name.ends_with(".json"));

    let snapshot: serde_json::Value = serde_json::from_str(contents).unwrap();
    assert_eq!(snapshot["title"], "Blue Widget");
}

#[tokio::test]
async fn test_update_regenerates_flagged_field() {
    let ctx = TestContext::new(catalog(), &["12.50"]);

    let response = ctx
        .run(
            "update_product",
            json!({"product_id": "1001", "generate_price": true}),
        )
        .await;

    assert!(!response.is_error, "{}", response.content);
    assert_eq!(ctx.completer.calls(), 1);
    let prompt = &ctx.completer.prompts()[0];
    assert!(prompt.starts_with("Suggest a suitable price for a product with title Blue Widget"));
    assert!(prompt.contains("existing price 10.00"));

    let stored = ctx.store.product(ProductId::new(1001)).unwrap();
    assert_eq!(stored.first_price(), Some(Price::parse("12.50").unwrap()));
}

#[tokio::test]
async fn test_update_stores_vendor_overflow_as_note() {
    let ctx = TestContext::new(catalog(), &["Acme, Globex", "Acme"]);

    let response = ctx
        .run(
            "update_product",
            json!({"product_id": "1001", "generate_vendor": true}),
        )
        .await;

    assert!(!response.is_error, "{}", response.content);
    assert_eq!(ctx.completer.calls(), 2);
    assert!(response.content.contains("Vendor: Acme"));
    assert!(
        response
            .content
            .ends_with("Vendor Information: Acme, Globex")
    );

    let metafields = ctx.store.metafields_of(ProductId::new(1001));
    assert_eq!(metafields.len(), 1);
    assert_eq!(metafields[0].namespace, "ai_metadata");
    assert_eq!(metafields[0].key, "ai_results");
    assert_eq!(metafields[0].value, "Vendor Information: Acme, Globex");
}

#[tokio::test]
async fn test_update_survives_failed_note_write() {
    let store = catalog();
    store.reject_metafields();
    let ctx = TestContext::new(store, &["Acme, Globex", "Acme"]);

    let response = ctx
        .run(
            "update_product",
            json!({"product_id": "1001", "generate_vendor": true}),
        )
        .await;

    assert!(!response.is_error, "{}", response.content);
    assert!(
        response
            .content
            .ends_with("Vendor Information: Acme, Globex")
    );
    assert_eq!(ctx.store.saves(), 1);
    assert_eq!(ctx.store.product(ProductId::new(1001)).unwrap().vendor, "Acme");
    assert!(ctx.store.metafields_of(ProductId::new(1001)).is_empty());
}

#[tokio::test]
async fn test_update_ignores_stored_values_it_does_not_touch() {
    let mut legacy = product("Old Thing", "", "Acme", "", "5");
    legacy.body_html = String::new();
    let ctx = TestContext::new(InMemoryStore::with_products([legacy]), &[]);

    let response = ctx
        .run("update_product", json!({"product_id": "1001", "vendor": "Initech"}))
        .await;

    assert!(!response.is_error, "{}", response.content);
    assert_eq!(
        ctx.store.product(ProductId::new(1001)).unwrap().vendor,
        "Initech"
    );
}

#[tokio::test]
async fn test_update_rejects_invalid_value() {
    let ctx = TestContext::new(catalog(), &[]);

    let response = ctx
        .run(
            "update_product",
            json!({"product_id": "1001", "description": "<div></div>"}),
        )
        .await;

    assert!(response.is_error);
    assert_eq!(
        response.content,
        "Validation error in field 'Description' with value '<div></div>': must contain text."
    );
    assert_eq!(ctx.store.saves(), 0);
}

#[tokio::test]
async fn test_update_unknown_product() {
    let ctx = TestContext::new(catalog(), &[]);

    let response = ctx
        .run("update_product", json!({"product_id": "999", "vendor": "Initech"}))
        .await;

    assert!(response.is_error);
    assert_eq!(response.content, "Product 999 not found.");
    assert!(ctx.writer.files().is_empty());
}

#[tokio::test]
async fn test_update_needs_numeric_id_and_a_change() {
    let ctx = TestContext::new(catalog(), &[]);

    let response = ctx
        .run("update_product", json!({"product_id": "Blue Widget", "vendor": "X"}))
        .await;
    assert!(response.is_error);
    assert_eq!(
        response.content,
        "Invalid input: 'Blue Widget' is not a numeric product ID."
    );

    let response = ctx.run("update_product", json!({"product_id": "1001"})).await;
    assert!(response.is_error);
    assert!(response.content.starts_with("Invalid input: Nothing to update"));
}

// =============================================================================
// bulk_update_products
// =============================================================================

#[tokio::test]
async fn test_bulk_update_matching_products() {
    let ctx = TestContext::new(catalog(), &[]);

    let response = ctx
        .run(
            "bulk_update_products",
            json!({"search_criteria": {"vendor": "acme"}, "price": "25"}),
        )
        .await;

    assert!(!response.is_error, "{}", response.content);
    assert!(response.content.starts_with("Updated 2 products:\n"));
    assert!(response.content.contains("Old Value"));
    assert!(response.content.contains("1001"));
    assert!(response.content.contains("1002"));
    assert!(!response.content.contains("1003"));
    assert!(response.content.contains("12.00"));

    let expected = Price::parse("25").unwrap();
    assert_eq!(
        ctx.store.product(ProductId::new(1001)).unwrap().first_price(),
        Some(expected)
    );
    assert_eq!(
        ctx.store.product(ProductId::new(1003)).unwrap().first_price(),
        Some(Price::parse("30").unwrap())
    );
    assert_eq!(ctx.writer.files().len(), 2);
}

#[tokio::test]
async fn test_bulk_update_stores_generation_notes() {
    let ctx = TestContext::new(catalog(), &["Acme, Globex", "Acme"]);

    let response = ctx
        .run(
            "bulk_update_products",
            json!({"search_criteria": {"vendor": "globex"}, "generate_vendor": true}),
        )
        .await;

    assert!(!response.is_error, "{}", response.content);
    assert!(response.content.starts_with("Updated 1 products:\n"));

    let metafields = ctx.store.metafields_of(ProductId::new(1003));
    assert_eq!(metafields.len(), 1);
    assert_eq!(metafields[0].value, "Vendor Information: Acme, Globex");
    assert!(ctx.store.metafields_of(ProductId::new(1001)).is_empty());
}

#[tokio::test]
async fn test_bulk_update_by_tag() {
    let ctx = TestContext::new(catalog(), &["Summer Co"]);

    let response = ctx
        .run(
            "bulk_update_products",
            json!({"search_criteria": {"tags": "Summer", "product_type": "gadget"}, "generate_vendor": true}),
        )
        .await;

    assert!(!response.is_error, "{}", response.content);
    assert!(response.content.starts_with("Updated 1 products:\n"));
    assert_eq!(
        ctx.store.product(ProductId::new(1003)).unwrap().vendor,
        "Summer Co"
    );
}

#[tokio::test]
async fn test_bulk_update_without_matches() {
    let ctx = TestContext::new(catalog(), &[]);

    let response = ctx
        .run(
            "bulk_update_products",
            json!({"search_criteria": {"vendor": "Nobody"}, "vendor": "Initech"}),
        )
        .await;

    assert!(!response.is_error);
    assert_eq!(response.content, "No updates were made.");
    assert_eq!(ctx.store.saves(), 0);
}

#[tokio::test]
async fn test_bulk_update_requires_criteria() {
    let ctx = TestContext::new(catalog(), &[]);

    let response = ctx
        .run(
            "bulk_update_products",
            json!({"search_criteria": {}, "vendor": "Initech"}),
        )
        .await;

    assert!(response.is_error);
    assert!(response.content.starts_with("Invalid input: search_criteria"));
}

#[tokio::test]
async fn test_bulk_update_reports_where_it_stopped() {
    let ctx = TestContext::new(catalog(), &[]);
    ctx.store.reject_saves(&["Vendor is invalid"]);

    let response = ctx
        .run(
            "bulk_update_products",
            json!({"search_criteria": {"vendor": "Acme"}, "vendor": "Initech"}),
        )
        .await;

    assert!(response.is_error);
    assert_eq!(
        response.content,
        "Bulk update stopped at product 1001 after updating 0 products: Failed to save product: Vendor is invalid"
    );
}
