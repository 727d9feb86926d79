//! End-to-end tests for `delete_product`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use serde_json::json;
use shop_agent_core::ProductId;
use shop_agent_integration_tests::{
    InMemoryStore, MemoryWriter, ScriptedCompleter, TestContext, product,
};
use shop_agent_tools::ToolExecutor;
use shop_agent_tools::backup::FileResourceWriter;

fn catalog() -> InMemoryStore {
    let store = InMemoryStore::with_products([
        product("Blue Widget", "Widget", "Acme", "blue", "10.00"),
        product("Red Widget", "Widget", "Acme", "red", "12.00"),
    ]);
    store.set_collections(ProductId::new(1001), &["Summer", "Sale"]);
    store
}

#[tokio::test]
async fn test_delete_reports_and_removes() {
    let ctx = TestContext::new(catalog(), &[]);

    let response = ctx
        .run("delete_product", json!({"product_id": "1001"}))
        .await;

    assert!(!response.is_error, "{}", response.content);
    assert!(
        response
            .content
            .starts_with("Successfully deleted 1001\n\nTitle: Blue Widget")
    );
    assert!(response.content.contains("Collections:\nSummer, Sale"));
    assert!(ctx.store.product(ProductId::new(1001)).is_none());
    assert!(ctx.store.product(ProductId::new(1002)).is_some());

    let files = ctx.writer.files();
    assert_eq!(files.len(), 1);
    assert!(files.keys().all(|name| name.starts_with("product_1001_delete_")));
}

#[tokio::test]
async fn test_delete_unknown_product() {
    let ctx = TestContext::new(catalog(), &[]);

    let response = ctx.run("delete_product", json!({"product_id": "42"})).await;

    assert!(response.is_error);
    assert_eq!(response.content, "Product 42 not found.");
    assert_eq!(ctx.store.products().len(), 2);
}

#[tokio::test]
async fn test_delete_requires_numeric_id() {
    let ctx = TestContext::new(catalog(), &[]);

    let response = ctx
        .run("delete_product", json!({"product_id": "Blue Widget"}))
        .await;

    assert!(response.is_error);
    assert_eq!(
        response.content,
        "Invalid input: 'Blue Widget' is not a numeric product ID."
    );
    assert_eq!(ctx.store.products().len(), 2);
}

#[tokio::test]
async fn test_delete_keeps_product_when_backup_fails() {
    let ctx = TestContext {
        store: catalog(),
        completer: ScriptedCompleter::default(),
        writer: MemoryWriter::failing(),
    };

    let response = ctx
        .run("delete_product", json!({"product_id": "1001"}))
        .await;

    assert!(response.is_error);
    assert!(response.content.starts_with("Backup failed: "));
    assert!(ctx.store.product(ProductId::new(1001)).is_some());
}

#[tokio::test]
async fn test_delete_writes_backup_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = catalog();
    let completer = ScriptedCompleter::default();
    let writer = FileResourceWriter::new(dir.path().join("backups"));
    let executor = ToolExecutor::new(&store, &completer, &writer);

    let response = executor
        .run("delete_product", &json!({"product_id": "1002"}))
        .await;
    assert!(!response.is_error, "{}", response.content);

    let entries: Vec<_> = std::fs::read_dir(dir.path().join("backups"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);

    let snapshot: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&entries[0]).unwrap()).unwrap();
    assert_eq!(snapshot["title"], "Red Widget");
    assert_eq!(snapshot["id"], 1002);
}
