//! Product tool definitions and the executor that runs them.
//!
//! Each tool declares a name, a description, and a JSON Schema for its
//! input. [`ToolExecutor::run`] dispatches by name and always answers with
//! text; failures come back as [`ToolResponse`]s with `is_error` set.
//!
//! Tools that delete or touch many products at once require confirmation
//! from the host before they run.

mod bulk;
mod create;
mod delete;
mod input;
mod read;
mod update;

use serde::Serialize;
use shop_agent_core::draft::notes_metafield;
use shop_agent_core::format::render_product;
use shop_agent_core::{Metafield, OverflowNote, Product, ProductId};
use tracing::{error, info, instrument, warn};

use crate::backup::ResourceWriter;
use crate::completion::TextCompleter;
use crate::error::ToolError;
use crate::generator::FieldGenerator;
use crate::shopify::{ProductStore, fetch_all_products};

/// A tool as advertised to the agent.
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    /// Name of the tool.
    pub name: String,
    /// Description of what the tool does.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: serde_json::Value,
    /// Whether the host must confirm before running the tool (internal).
    #[serde(skip)]
    pub requires_confirmation: bool,
}

/// Get all product tools.
#[must_use]
pub fn all_tools() -> Vec<Tool> {
    vec![
        create::definition(),
        update::definition(),
        bulk::definition(),
        delete::definition(),
        read::get_product_definition(),
        read::get_all_product_data_definition(),
        read::get_all_products_definition(),
        read::search_products_definition(),
    ]
}

/// Get a tool by name.
#[must_use]
pub fn get_tool_by_name(name: &str) -> Option<Tool> {
    all_tools().into_iter().find(|t| t.name == name)
}

/// Get tool names from a list of tools.
#[must_use]
pub fn get_tool_names(tools: &[Tool]) -> Vec<&str> {
    tools.iter().map(|t| t.name.as_str()).collect()
}

/// Check if a tool requires confirmation.
#[must_use]
pub fn requires_confirmation(tool_name: &str) -> bool {
    get_tool_by_name(tool_name).is_some_and(|t| t.requires_confirmation)
}

/// Text answer of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResponse {
    pub content: String,
    pub is_error: bool,
}

impl ToolResponse {
    #[must_use]
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    #[must_use]
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// Executor for product tools.
///
/// Borrows its collaborators; one executor can serve any number of
/// sequential invocations.
pub struct ToolExecutor<'a> {
    store: &'a dyn ProductStore,
    completer: &'a dyn TextCompleter,
    writer: &'a dyn ResourceWriter,
}

impl<'a> ToolExecutor<'a> {
    /// Create a new tool executor.
    #[must_use]
    pub const fn new(
        store: &'a dyn ProductStore,
        completer: &'a dyn TextCompleter,
        writer: &'a dyn ResourceWriter,
    ) -> Self {
        Self {
            store,
            completer,
            writer,
        }
    }

    /// Run a tool and render any failure as text.
    #[instrument(skip(self, input), fields(tool_name = %name))]
    pub async fn run(&self, name: &str, input: &serde_json::Value) -> ToolResponse {
        match self.execute(name, input).await {
            Ok(content) => {
                info!("Tool succeeded");
                ToolResponse::success(content)
            }
            Err(e) => {
                if e.is_input_error() {
                    warn!(error = %e, "Tool rejected input");
                } else {
                    error!(error = %e, "Tool failed");
                }
                ToolResponse::error(e.to_string())
            }
        }
    }

    /// Execute a tool and return the result as a string.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidInput`] for unknown tools, otherwise the
    /// tool's own failure.
    pub async fn execute(
        &self,
        name: &str,
        input: &serde_json::Value,
    ) -> Result<String, ToolError> {
        match name {
            "create_product" => self.create_product(input).await,
            "update_product" => self.update_product(input).await,
            "bulk_update_products" => self.bulk_update_products(input).await,
            "delete_product" => self.delete_product(input).await,
            "get_product" => self.get_product(input).await,
            "get_all_product_data" => self.get_all_product_data(input).await,
            "get_all_products" => self.get_all_products(input).await,
            "search_products" => self.search_products(input).await,
            _ => Err(ToolError::InvalidInput(format!("Unknown tool: {name}"))),
        }
    }

    // =========================================================================
    // Shared steps
    // =========================================================================

    fn generator(&self) -> FieldGenerator<'a> {
        FieldGenerator::new(self.completer)
    }

    /// Fetch a product by ID or fail with [`ToolError::NotFound`].
    async fn find_existing(&self, id: ProductId) -> Result<Product, ToolError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| ToolError::NotFound(id.to_string()))
    }

    /// Fetch a product by numeric ID, or by exact case-insensitive title
    /// across the whole catalog.
    ///
    /// An all-digit identifier with no matching ID is tried as a title.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Product, ToolError> {
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<ProductId>() {
            if let Some(product) = self.store.find(id).await? {
                return Ok(product);
            }
        }

        let wanted = identifier.to_lowercase();
        fetch_all_products(self.store)
            .await?
            .into_iter()
            .find(|p| p.title.to_lowercase() == wanted)
            .ok_or_else(|| ToolError::NotFound(identifier.to_string()))
    }

    /// Save a product, attach the overflow notes, and return the stored
    /// product with its metafields.
    ///
    /// A failure to attach notes is logged and does not fail the save.
    async fn save_with_notes(
        &self,
        product: &Product,
        notes: &[OverflowNote],
    ) -> Result<(Product, Vec<Metafield>), ToolError> {
        let saved = self
            .store
            .save(product)
            .await
            .map_err(ToolError::from_save)?;
        let id = saved.id.ok_or_else(|| {
            ToolError::Persistence("the store returned the product without an ID".to_string())
        })?;

        if let Some(metafield) = notes_metafield(notes) {
            if let Err(e) = self.store.add_metafield(id, &metafield).await {
                error!(product_id = %id, error = %e, "Failed to save generation notes");
            }
        }

        let metafields = self.store.metafields(id).await?;
        Ok((saved, metafields))
    }

    /// Full report of a product, with collections.
    async fn report_with_collections(&self, product: &Product) -> Result<String, ToolError> {
        let Some(id) = product.id else {
            return Ok(render_product(product, &[], None, &[]));
        };
        let metafields = self.store.metafields(id).await?;
        let collections = self.store.collections(id).await?;
        Ok(render_product(
            product,
            &metafields,
            Some(&collections),
            &[],
        ))
    }
}
