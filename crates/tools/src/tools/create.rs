//! `create_product`: new product with every missing field generated.

use serde::Deserialize;
use serde_json::json;
use shop_agent_core::format::render_product;
use shop_agent_core::validate::validate_draft;
use shop_agent_core::{DraftMode, Product, ProductDraft, ProductField};
use tracing::{info, instrument};

use super::input::{loose_string, non_blank, parse_input};
use super::{Tool, ToolExecutor};
use crate::error::ToolError;
use crate::generator::{FieldRequest, GenerationPlan};

pub(super) fn definition() -> Tool {
    Tool {
        name: "create_product".to_string(),
        description: "Create a new product in the Shopify store. Any of title, description, \
            product type, vendor, tags, or price that is not supplied is generated by AI from \
            the fields that are. At least one of title, product_type, or description is \
            required. Text that does not fit a field is saved on the product as AI metadata."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Title of the product"
                },
                "description": {
                    "type": "string",
                    "description": "Description of the product, plain text or HTML"
                },
                "product_type": {
                    "type": "string",
                    "description": "Type of the product"
                },
                "vendor": {
                    "type": "string",
                    "description": "Vendor of the product"
                },
                "tags": {
                    "type": "string",
                    "description": "Comma-separated tags"
                },
                "price": {
                    "type": "string",
                    "description": "Price of the product (e.g., '19.99')"
                },
                "context": {
                    "type": "string",
                    "description": "Optional context used when generating fields (e.g., store name, theme)"
                }
            }
        }),
        requires_confirmation: false,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateProductInput {
    title: Option<String>,
    description: Option<String>,
    product_type: Option<String>,
    vendor: Option<String>,
    tags: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    price: Option<String>,
    context: Option<String>,
}

impl CreateProductInput {
    /// Use what was given, generate the rest.
    fn plan(&self) -> GenerationPlan {
        [
            (ProductField::Title, &self.title),
            (ProductField::Description, &self.description),
            (ProductField::ProductType, &self.product_type),
            (ProductField::Tags, &self.tags),
            (ProductField::Price, &self.price),
            (ProductField::Vendor, &self.vendor),
        ]
        .into_iter()
        .fold(GenerationPlan::new(), |plan, (field, literal)| {
            let generate = non_blank(literal.as_deref()).is_none();
            plan.with(field, FieldRequest::new(generate, literal.clone()))
        })
    }
}

impl ToolExecutor<'_> {
    #[instrument(skip_all)]
    pub(super) async fn create_product(
        &self,
        input: &serde_json::Value,
    ) -> Result<String, ToolError> {
        let input: CreateProductInput = parse_input(input)?;

        if [&input.title, &input.product_type, &input.description]
            .iter()
            .all(|v| non_blank(v.as_deref()).is_none())
        {
            return Err(ToolError::InvalidInput(
                "Insufficient information provided to generate a new product. Please ensure \
                 that the product title, product type, or description are adequately specified."
                    .to_string(),
            ));
        }

        let mut draft = ProductDraft::default();
        let notes = self
            .generator()
            .resolve_all(&mut draft, &input.plan(), non_blank(input.context.as_deref()))
            .await?;

        let validated = validate_draft(&draft, DraftMode::Create)?;
        let mut product = Product::default();
        validated.apply_to(&mut product);

        let (saved, metafields) = self.save_with_notes(&product, &notes).await?;
        info!(product_id = ?saved.id, notes = notes.len(), "Product created");

        Ok(render_product(&saved, &metafields, None, &notes))
    }
}
