//! Shopify REST Admin API access for products (HIGH PRIVILEGE).
//!
//! # Security
//!
//! **This module holds the Admin API access token.** The token can create,
//! change and delete every product in the store.
//!
//! # Architecture
//!
//! - [`ProductStore`] is the seam the tools depend on
//! - [`AdminClient`] implements it over the REST Admin API
//! - No retries: a 429 surfaces as [`AdminShopifyError::RateLimited`]
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_agent_tools::shopify::{AdminClient, ProductStore, fetch_all_products};
//!
//! let client = AdminClient::new(config.shopify())?;
//!
//! let product = client.find(ProductId::new(632910392)).await?;
//! let everything = fetch_all_products(&client).await?;
//! ```

mod client;
mod conversions;
pub mod types;

pub use client::AdminClient;

use async_trait::async_trait;
use shop_agent_core::{Metafield, Product, ProductId};
use thiserror::Error;
use tracing::{debug, instrument};

/// Page size used when walking the whole catalog.
pub const PAGE_LIMIT: usize = 100;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The store rejected the submitted resource.
    #[error("{}", .0.join(", "))]
    UserError(Vec<String>),

    /// Unexpected response status.
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Client could not be built from the configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Product persistence used by the tools.
///
/// Implemented by [`AdminClient`] for the live store and by in-memory fakes
/// in tests.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Fetch one product. `Ok(None)` when it does not exist.
    async fn find(&self, id: ProductId) -> Result<Option<Product>, AdminShopifyError>;

    /// Fetch up to `limit` products with IDs greater than `since_id`, in
    /// ascending ID order.
    async fn find_page(
        &self,
        since_id: Option<ProductId>,
        limit: usize,
    ) -> Result<Vec<Product>, AdminShopifyError>;

    /// Create the product when it has no ID, update it otherwise.
    ///
    /// Returns the product as stored.
    async fn save(&self, product: &Product) -> Result<Product, AdminShopifyError>;

    /// Delete a product.
    async fn destroy(&self, id: ProductId) -> Result<(), AdminShopifyError>;

    /// Attach a metafield to a product.
    async fn add_metafield(
        &self,
        id: ProductId,
        metafield: &Metafield,
    ) -> Result<Metafield, AdminShopifyError>;

    /// All metafields of a product.
    async fn metafields(&self, id: ProductId) -> Result<Vec<Metafield>, AdminShopifyError>;

    /// Titles of the custom and smart collections containing a product.
    async fn collections(&self, id: ProductId) -> Result<Vec<String>, AdminShopifyError>;
}

/// Walk the catalog page by page and return every product.
///
/// Stops at the first page shorter than [`PAGE_LIMIT`].
///
/// # Errors
///
/// Returns the first store error encountered.
#[instrument(skip(store))]
pub async fn fetch_all_products(
    store: &dyn ProductStore,
) -> Result<Vec<Product>, AdminShopifyError> {
    let mut products = Vec::new();
    let mut since_id = None;

    loop {
        let page = store.find_page(since_id, PAGE_LIMIT).await?;
        let page_len = page.len();
        let last_id = page.last().and_then(|p| p.id);
        products.extend(page);

        match last_id {
            Some(id) if page_len >= PAGE_LIMIT => since_id = Some(id),
            _ => break,
        }
    }

    debug!(count = products.len(), "Fetched catalog");
    Ok(products)
}
