//! `delete_product`: remove one product by ID after backing it up.

use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::input::{loose_string, parse_input, parse_product_id};
use super::{Tool, ToolExecutor};
use crate::backup::{BackupAction, back_up_product};
use crate::error::ToolError;

pub(super) fn definition() -> Tool {
    Tool {
        name: "delete_product".to_string(),
        description: "Delete a product from the Shopify store. Must be called with the \
            numeric product ID to avoid deleting the wrong product. The product is backed up \
            first and its details are returned."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "product_id": {
                    "type": "string",
                    "description": "The numeric ID of the product to delete"
                }
            },
            "required": ["product_id"]
        }),
        requires_confirmation: true,
    }
}

#[derive(Debug, Deserialize)]
struct DeleteProductInput {
    #[serde(default, deserialize_with = "loose_string")]
    product_id: Option<String>,
}

impl ToolExecutor<'_> {
    #[instrument(skip_all)]
    pub(super) async fn delete_product(
        &self,
        input: &serde_json::Value,
    ) -> Result<String, ToolError> {
        let input: DeleteProductInput = parse_input(input)?;
        let id = parse_product_id(input.product_id.as_deref())?;

        let product = self.find_existing(id).await?;
        let report = self.report_with_collections(&product).await?;

        let backup = back_up_product(self.writer, id, &product, BackupAction::Delete).await?;
        self.store.destroy(id).await?;
        info!(product_id = %id, backup = %backup, "Product deleted");

        Ok(format!("Successfully deleted {id}\n\n{report}"))
    }
}
