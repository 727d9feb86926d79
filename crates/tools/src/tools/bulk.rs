//! `bulk_update_products`: apply one update to every matching product.

use serde::Deserialize;
use serde_json::json;
use shop_agent_core::format::render_table;
use shop_agent_core::normalize::html_to_plain_text;
use shop_agent_core::{ProductDraft, ProductField};
use tracing::{info, instrument, warn};

use super::input::{FieldArgs, SearchCriteria, parse_input};
use super::update::{AppliedUpdate, ensure_something_to_do};
use super::{Tool, ToolExecutor};
use crate::error::ToolError;
use crate::shopify::fetch_all_products;

const CHANGE_HEADERS: [&str; 4] = ["Product ID", "Field", "Old Value", "New Value"];

pub(super) fn definition() -> Tool {
    Tool {
        name: "bulk_update_products".to_string(),
        description: "Update every product matching the search criteria with the same \
            values or generate_* flags as update_product. Criteria match case-insensitively; \
            text criteria match substrings and all listed tags must be present. Returns a \
            table of the changed fields."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "search_criteria": {
                    "type": "object",
                    "description": "Which products to update; at least one criterion is required",
                    "properties": {
                        "title": {"type": "string", "description": "Text contained in the title"},
                        "product_type": {"type": "string", "description": "Text contained in the product type"},
                        "vendor": {"type": "string", "description": "Text contained in the vendor"},
                        "tags": {"type": "string", "description": "Comma-separated tags that must all be present"}
                    }
                },
                "generate_title": {"type": "boolean", "description": "Generate each title from the product details"},
                "generate_description": {"type": "boolean", "description": "Generate each description from the product details"},
                "generate_product_type": {"type": "boolean", "description": "Generate each product type from the product details"},
                "generate_vendor": {"type": "boolean", "description": "Generate each vendor from the product details"},
                "generate_tags": {"type": "boolean", "description": "Generate each product's tags from its details"},
                "generate_price": {"type": "boolean", "description": "Generate each price from the product details"},
                "title": {"type": "string", "description": "New title"},
                "description": {"type": "string", "description": "New description, plain text or HTML"},
                "product_type": {"type": "string", "description": "New product type"},
                "vendor": {"type": "string", "description": "New vendor"},
                "tags": {"type": "string", "description": "New comma-separated tags"},
                "price": {"type": "string", "description": "New price of the first variant"},
                "context": {"type": "string", "description": "Optional context used when generating fields"}
            },
            "required": ["search_criteria"]
        }),
        requires_confirmation: true,
    }
}

#[derive(Debug, Deserialize)]
struct BulkUpdateInput {
    #[serde(default)]
    search_criteria: SearchCriteria,
    #[serde(flatten)]
    fields: FieldArgs,
}

impl ToolExecutor<'_> {
    #[instrument(skip_all)]
    pub(super) async fn bulk_update_products(
        &self,
        input: &serde_json::Value,
    ) -> Result<String, ToolError> {
        let input: BulkUpdateInput = parse_input(input)?;
        if input.search_criteria.is_empty() {
            return Err(ToolError::InvalidInput(
                "search_criteria needs at least one of title, product_type, vendor, or tags."
                    .to_string(),
            ));
        }
        ensure_something_to_do(&input.fields)?;

        let matching: Vec<_> = fetch_all_products(self.store)
            .await?
            .into_iter()
            .filter(|p| input.search_criteria.matches(p))
            .collect();
        info!(matches = matching.len(), "Bulk update selected products");

        let mut rows = Vec::new();
        let mut updated = 0;

        for product in matching {
            let Some(id) = product.id else {
                warn!(title = %product.title, "Skipping product without an ID");
                continue;
            };

            let applied = self
                .apply_update(id, product, &input.fields)
                .await
                .map_err(|e| ToolError::BulkUpdate {
                    product_id: id,
                    updated,
                    source: Box::new(e),
                })?;

            rows.extend(change_rows(&applied));
            updated += 1;
        }

        if updated == 0 {
            return Ok("No updates were made.".to_string());
        }
        Ok(format!(
            "Updated {updated} products:\n{}",
            render_table(&CHANGE_HEADERS, &rows)
        ))
    }
}

/// One row per changed field.
fn change_rows(applied: &AppliedUpdate) -> Vec<Vec<String>> {
    applied
        .changes
        .present_fields()
        .into_iter()
        .map(|field| {
            vec![
                applied.id.to_string(),
                field.label().to_string(),
                display_value(&applied.before, field),
                display_value(&applied.changes, field),
            ]
        })
        .collect()
}

fn display_value(draft: &ProductDraft, field: ProductField) -> String {
    let value = draft.get(field).unwrap_or_default();
    if field == ProductField::Description {
        html_to_plain_text(value)
    } else {
        value.to_string()
    }
}
