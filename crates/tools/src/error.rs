//! Unified error handling for tool invocations.

use shop_agent_core::{ProductId, ValidationError};
use thiserror::Error;

use crate::backup::BackupError;
use crate::generator::GenerationError;
use crate::shopify::AdminShopifyError;

/// Terminal failure of a single tool invocation.
///
/// Every variant renders as the human-readable text returned to the agent.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No product matches the identifier.
    #[error("Product {0} not found.")]
    NotFound(String),

    /// A field failed validation before anything was saved.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The language model returned nothing usable.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The store rejected the product.
    #[error("Failed to save product: {0}")]
    Persistence(String),

    /// Tool arguments were missing or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The store could not be reached or answered unexpectedly.
    #[error("Shopify error: {0}")]
    Store(#[from] AdminShopifyError),

    /// A result could not be rendered as JSON.
    #[error("Failed to serialize product: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The pre-change snapshot could not be written.
    #[error("Backup failed: {0}")]
    Backup(#[from] BackupError),

    /// A bulk update stopped part-way through.
    #[error("Bulk update stopped at product {product_id} after updating {updated} products: {source}")]
    BulkUpdate {
        /// Product whose update failed.
        product_id: ProductId,
        /// Products updated before the failure.
        updated: usize,
        /// The failure.
        source: Box<ToolError>,
    },
}

impl ToolError {
    /// Map a failed save to [`ToolError::Persistence`] when the store
    /// rejected the product itself.
    #[must_use]
    pub fn from_save(error: AdminShopifyError) -> Self {
        match error {
            AdminShopifyError::UserError(messages) => Self::Persistence(messages.join(", ")),
            other => Self::Store(other),
        }
    }

    /// Whether the failure came from the caller's input rather than a
    /// collaborator.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Validation(_) | Self::InvalidInput(_)
        )
    }
}
