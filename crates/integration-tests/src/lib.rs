//! Integration tests for Shop Agent.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shop-agent-integration-tests
//! ```
//!
//! No network access is needed: every tool runs against the in-memory
//! fakes below.
//!
//! - [`InMemoryStore`] - a [`ProductStore`] with ascending IDs and paging
//! - [`ScriptedCompleter`] - a [`TextCompleter`] that replays canned replies
//! - [`MemoryWriter`] - a [`ResourceWriter`] that keeps backups in memory

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ops::Bound;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use shop_agent_core::{Metafield, MetafieldId, Price, Product, ProductId, Variant};
use shop_agent_tools::backup::{BackupError, ResourceWriter};
use shop_agent_tools::completion::{CompletionError, TextCompleter};
use shop_agent_tools::shopify::{AdminShopifyError, ProductStore};
use shop_agent_tools::{ToolExecutor, ToolResponse};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Build a product with a single priced variant and no ID.
#[must_use]
pub fn product(title: &str, product_type: &str, vendor: &str, tags: &str, price: &str) -> Product {
    Product {
        title: title.to_string(),
        body_html: format!("<p>About {title}.</p>"),
        product_type: product_type.to_string(),
        vendor: vendor.to_string(),
        tags: tags.to_string(),
        variants: vec![Variant {
            title: "Default Title".to_string(),
            price: Price::parse(price).ok(),
            ..Variant::default()
        }],
        ..Product::default()
    }
}

// =============================================================================
// Store
// =============================================================================

#[derive(Default)]
struct StoreState {
    products: BTreeMap<u64, Product>,
    metafields: HashMap<u64, Vec<Metafield>>,
    collections: HashMap<u64, Vec<String>>,
    next_id: u64,
    next_metafield_id: u64,
    rejection: Option<Vec<String>>,
    metafields_rejected: bool,
    saves: usize,
    page_requests: usize,
}

/// Product store held in memory.
///
/// IDs are assigned in ascending order starting at 1001.
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                next_id: 1001,
                next_metafield_id: 1,
                ..StoreState::default()
            }),
        }
    }

    /// Store seeded with `products`, IDs assigned in order.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Self::new();
        for product in products {
            store.insert(product);
        }
        store
    }

    /// Insert a product directly, bypassing rejection, and return its ID.
    pub fn insert(&self, mut product: Product) -> ProductId {
        let mut state = lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        product.id = Some(ProductId::new(id));
        state.products.insert(id, product);
        ProductId::new(id)
    }

    /// Put a product into the named collections.
    pub fn set_collections(&self, id: ProductId, titles: &[&str]) {
        lock(&self.state).collections.insert(
            id.as_u64(),
            titles.iter().map(ToString::to_string).collect(),
        );
    }

    /// Make every later save fail with these store messages.
    pub fn reject_saves(&self, messages: &[&str]) {
        lock(&self.state).rejection = Some(messages.iter().map(ToString::to_string).collect());
    }

    /// Make every later metafield write fail.
    pub fn reject_metafields(&self) {
        lock(&self.state).metafields_rejected = true;
    }

    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<Product> {
        lock(&self.state).products.get(&id.as_u64()).cloned()
    }

    /// Every stored product, ascending by ID.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        lock(&self.state).products.values().cloned().collect()
    }

    #[must_use]
    pub fn metafields_of(&self, id: ProductId) -> Vec<Metafield> {
        lock(&self.state)
            .metafields
            .get(&id.as_u64())
            .cloned()
            .unwrap_or_default()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn saves(&self) -> usize {
        lock(&self.state).saves
    }

    /// Number of `find_page` calls.
    #[must_use]
    pub fn page_requests(&self) -> usize {
        lock(&self.state).page_requests
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn find(&self, id: ProductId) -> Result<Option<Product>, AdminShopifyError> {
        Ok(self.product(id))
    }

    async fn find_page(
        &self,
        since_id: Option<ProductId>,
        limit: usize,
    ) -> Result<Vec<Product>, AdminShopifyError> {
        let mut state = lock(&self.state);
        state.page_requests += 1;
        let lower = since_id.map_or(Bound::Unbounded, |id| Bound::Excluded(id.as_u64()));
        Ok(state
            .products
            .range((lower, Bound::Unbounded))
            .take(limit)
            .map(|(_, product)| product.clone())
            .collect())
    }

    async fn save(&self, product: &Product) -> Result<Product, AdminShopifyError> {
        let mut state = lock(&self.state);
        if let Some(messages) = &state.rejection {
            return Err(AdminShopifyError::UserError(messages.clone()));
        }

        let id = match product.id {
            Some(id) if state.products.contains_key(&id.as_u64()) => id.as_u64(),
            Some(id) => return Err(AdminShopifyError::NotFound(format!("product {id}"))),
            None => {
                let id = state.next_id;
                state.next_id += 1;
                id
            }
        };

        let mut saved = product.clone();
        saved.id = Some(ProductId::new(id));
        state.products.insert(id, saved.clone());
        state.saves += 1;
        Ok(saved)
    }

    async fn destroy(&self, id: ProductId) -> Result<(), AdminShopifyError> {
        let mut state = lock(&self.state);
        state
            .products
            .remove(&id.as_u64())
            .map(|_| ())
            .ok_or_else(|| AdminShopifyError::NotFound(format!("product {id}")))
    }

    async fn add_metafield(
        &self,
        id: ProductId,
        metafield: &Metafield,
    ) -> Result<Metafield, AdminShopifyError> {
        let mut state = lock(&self.state);
        if state.metafields_rejected {
            return Err(AdminShopifyError::Status {
                status: 500,
                body: "metafield write failed".to_string(),
            });
        }
        let mut stored = metafield.clone();
        stored.id = Some(MetafieldId::new(state.next_metafield_id));
        state.next_metafield_id += 1;
        state
            .metafields
            .entry(id.as_u64())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn metafields(&self, id: ProductId) -> Result<Vec<Metafield>, AdminShopifyError> {
        Ok(self.metafields_of(id))
    }

    async fn collections(&self, id: ProductId) -> Result<Vec<String>, AdminShopifyError> {
        Ok(lock(&self.state)
            .collections
            .get(&id.as_u64())
            .cloned()
            .unwrap_or_default())
    }
}

// =============================================================================
// Completer
// =============================================================================

/// Replays canned replies in order and records every prompt.
///
/// Running out of replies is a completion error.
#[derive(Default)]
pub struct ScriptedCompleter {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompleter {
    #[must_use]
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(ToString::to_string).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        lock(&self.prompts).len()
    }
}

#[async_trait]
impl TextCompleter for ScriptedCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        lock(&self.prompts).push(prompt.to_string());
        lock(&self.replies)
            .pop_front()
            .ok_or_else(|| CompletionError::Other("no scripted reply left".to_string()))
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Keeps written resources in memory.
#[derive(Default)]
pub struct MemoryWriter {
    files: Mutex<BTreeMap<String, String>>,
    failing: bool,
}

impl MemoryWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer whose every write fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Written resources by name.
    #[must_use]
    pub fn files(&self) -> BTreeMap<String, String> {
        lock(&self.files).clone()
    }
}

#[async_trait]
impl ResourceWriter for MemoryWriter {
    async fn write_file(&self, name: &str, contents: &str) -> Result<(), BackupError> {
        if self.failing {
            return Err(BackupError::Io {
                path: name.into(),
                source: std::io::Error::other("disk full"),
            });
        }
        lock(&self.files).insert(name.to_string(), contents.to_string());
        Ok(())
    }
}

// =============================================================================
// Harness
// =============================================================================

/// Fakes wired into a [`ToolExecutor`].
#[derive(Default)]
pub struct TestContext {
    pub store: InMemoryStore,
    pub completer: ScriptedCompleter,
    pub writer: MemoryWriter,
}

impl TestContext {
    #[must_use]
    pub fn new(store: InMemoryStore, replies: &[&str]) -> Self {
        Self {
            store,
            completer: ScriptedCompleter::new(replies),
            writer: MemoryWriter::new(),
        }
    }

    #[must_use]
    pub fn executor(&self) -> ToolExecutor<'_> {
        ToolExecutor::new(&self.store, &self.completer, &self.writer)
    }

    /// Run a tool and return its response.
    pub async fn run(&self, tool: &str, input: serde_json::Value) -> ToolResponse {
        self.executor().run(tool, &input).await
    }
}
