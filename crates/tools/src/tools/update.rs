//! `update_product`: change, or regenerate, fields of one product.

use serde::Deserialize;
use serde_json::json;
use shop_agent_core::format::render_product;
use shop_agent_core::validate::validate_draft;
use shop_agent_core::{DraftMode, Metafield, OverflowNote, Product, ProductDraft, ProductId};
use tracing::{info, instrument};

use super::input::{FieldArgs, loose_string, parse_input, parse_product_id};
use super::{Tool, ToolExecutor};
use crate::backup::{BackupAction, back_up_product};
use crate::error::ToolError;

pub(super) fn definition() -> Tool {
    Tool {
        name: "update_product".to_string(),
        description: "Update a product in the Shopify store by ID. Supplied values replace \
            the current ones; fields whose generate_* flag is set and that have no supplied \
            value are regenerated by AI from the product's other fields. The product is backed \
            up before it is changed."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "product_id": {
                    "type": "string",
                    "description": "The numeric ID of the product to update"
                },
                "generate_title": {
                    "type": "boolean",
                    "description": "Generate the title from the current product details"
                },
                "generate_description": {
                    "type": "boolean",
                    "description": "Generate the description from the current product details"
                },
                "generate_product_type": {
                    "type": "boolean",
                    "description": "Generate the product type from the current product details"
                },
                "generate_vendor": {
                    "type": "boolean",
                    "description": "Generate the vendor from the current product details"
                },
                "generate_tags": {
                    "type": "boolean",
                    "description": "Generate the tags from the current product details"
                },
                "generate_price": {
                    "type": "boolean",
                    "description": "Generate the price from the current product details"
                },
                "title": {
                    "type": "string",
                    "description": "New title"
                },
                "description": {
                    "type": "string",
                    "description": "New description, plain text or HTML"
                },
                "product_type": {
                    "type": "string",
                    "description": "New product type"
                },
                "vendor": {
                    "type": "string",
                    "description": "New vendor"
                },
                "tags": {
                    "type": "string",
                    "description": "New comma-separated tags"
                },
                "price": {
                    "type": "string",
                    "description": "New price of the first variant"
                },
                "context": {
                    "type": "string",
                    "description": "Optional context used when generating fields (e.g., store name, theme)"
                }
            },
            "required": ["product_id"]
        }),
        requires_confirmation: false,
    }
}

#[derive(Debug, Deserialize)]
struct UpdateProductInput {
    #[serde(default, deserialize_with = "loose_string")]
    product_id: Option<String>,
    #[serde(flatten)]
    fields: FieldArgs,
}

/// Result of updating one product.
pub(super) struct AppliedUpdate {
    pub id: ProductId,
    /// Field values before the update.
    pub before: ProductDraft,
    /// Only the fields that changed, with their new values.
    pub changes: ProductDraft,
    pub saved: Product,
    pub metafields: Vec<Metafield>,
    pub notes: Vec<OverflowNote>,
}

impl ToolExecutor<'_> {
    #[instrument(skip_all)]
    pub(super) async fn update_product(
        &self,
        input: &serde_json::Value,
    ) -> Result<String, ToolError> {
        let input: UpdateProductInput = parse_input(input)?;
        let id = parse_product_id(input.product_id.as_deref())?;
        ensure_something_to_do(&input.fields)?;

        let product = self.find_existing(id).await?;
        let applied = self.apply_update(id, product, &input.fields).await?;

        Ok(render_product(
            &applied.saved,
            &applied.metafields,
            None,
            &applied.notes,
        ))
    }

    /// Back up, resolve, validate the changed fields, and save.
    ///
    /// Nothing is saved unless every changed field passes validation.
    pub(super) async fn apply_update(
        &self,
        id: ProductId,
        mut product: Product,
        fields: &FieldArgs,
    ) -> Result<AppliedUpdate, ToolError> {
        back_up_product(self.writer, id, &product, BackupAction::Update).await?;

        let before = ProductDraft::from_product(&product);
        let mut draft = before.clone();
        let notes = self
            .generator()
            .resolve_all(&mut draft, &fields.plan(), fields.context())
            .await?;

        let changes = draft.changes_from(&before);
        let validated = validate_draft(&changes, DraftMode::Update)?;
        validated.apply_to(&mut product);

        let (saved, metafields) = self.save_with_notes(&product, &notes).await?;
        info!(
            product_id = %id,
            changed = ?changes.present_fields(),
            notes = notes.len(),
            "Product updated"
        );

        Ok(AppliedUpdate {
            id,
            before,
            changes,
            saved,
            metafields,
            notes,
        })
    }
}

/// Reject invocations that would change nothing.
pub(super) fn ensure_something_to_do(fields: &FieldArgs) -> Result<(), ToolError> {
    if fields.plan().touches_anything() {
        Ok(())
    } else {
        Err(ToolError::InvalidInput(
            "Nothing to update: supply a new value or set a generate_* flag.".to_string(),
        ))
    }
}
