//! Read-only tools: single product lookups, listing, and search.

use serde::{Deserialize, Serialize};
use serde_json::json;
use shop_agent_core::format::{parse_columns, render_listing};
use shop_agent_core::{ListColumn, Metafield, Product, SortOrder};
use tracing::{debug, instrument};

use super::input::{SearchCriteria, loose_string, non_blank, parse_input};
use super::{Tool, ToolExecutor};
use crate::error::ToolError;
use crate::shopify::fetch_all_products;

fn identifier_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "product_identifier": {
                "type": "string",
                "description": "The numeric ID or the exact title of the product"
            }
        },
        "required": ["product_identifier"]
    })
}

fn listing_properties() -> serde_json::Value {
    json!({
        "sortby": {
            "type": "string",
            "enum": SortOrder::NAMES,
            "description": "Sort order (default keeps store order)"
        },
        "output": {
            "type": "array",
            "items": {"type": "string"},
            "description": "Columns to show: Product ID, Title, Price, Vendor, Product Type, Tags. Default is Product ID, Title, Price."
        }
    })
}

pub(super) fn get_product_definition() -> Tool {
    Tool {
        name: "get_product".to_string(),
        description: "Fetch a product's details by ID or title: title, description, type, \
            vendor, collections, tags, price, and metafields."
            .to_string(),
        input_schema: identifier_schema(),
        requires_confirmation: false,
    }
}

pub(super) fn get_all_product_data_definition() -> Tool {
    Tool {
        name: "get_all_product_data".to_string(),
        description: "Fetch every stored attribute of a product by ID or title, including \
            variants and metafields, as JSON."
            .to_string(),
        input_schema: identifier_schema(),
        requires_confirmation: false,
    }
}

pub(super) fn get_all_products_definition() -> Tool {
    Tool {
        name: "get_all_products".to_string(),
        description: "List every product in the store as a table.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": listing_properties()
        }),
        requires_confirmation: false,
    }
}

pub(super) fn search_products_definition() -> Tool {
    let mut properties = json!({
        "title": {"type": "string", "description": "Text contained in the title"},
        "product_type": {"type": "string", "description": "Text contained in the product type"},
        "vendor": {"type": "string", "description": "Text contained in the vendor"},
        "tags": {"type": "string", "description": "Comma-separated tags that must all be present"}
    });
    if let (Some(properties), serde_json::Value::Object(listing)) =
        (properties.as_object_mut(), listing_properties())
    {
        properties.extend(listing);
    }

    Tool {
        name: "search_products".to_string(),
        description: "Search products by title, product type, vendor, or tags and list the \
            matches as a table. At least one criterion is required."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": properties
        }),
        requires_confirmation: false,
    }
}

#[derive(Debug, Deserialize)]
struct IdentifierInput {
    #[serde(default, deserialize_with = "loose_string")]
    product_identifier: Option<String>,
}

impl IdentifierInput {
    fn identifier(&self) -> Result<&str, ToolError> {
        non_blank(self.product_identifier.as_deref()).ok_or_else(|| {
            ToolError::InvalidInput("product_identifier is required.".to_string())
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListingInput {
    sortby: Option<String>,
    output: Vec<String>,
}

impl ListingInput {
    fn sort_order(&self) -> Result<SortOrder, ToolError> {
        self.sortby
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|e: shop_agent_core::format::UnknownSortOrder| {
                ToolError::InvalidInput(e.to_string())
            })
    }

    fn columns(&self) -> Vec<ListColumn> {
        parse_columns(&self.output)
    }
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    #[serde(flatten)]
    criteria: SearchCriteria,
    #[serde(flatten)]
    listing: ListingInput,
}

/// Product plus its metafields, as returned by `get_all_product_data`.
#[derive(Serialize)]
struct FullProductData<'a> {
    #[serde(flatten)]
    product: &'a Product,
    metafields: &'a [Metafield],
}

impl ToolExecutor<'_> {
    #[instrument(skip_all)]
    pub(super) async fn get_product(&self, input: &serde_json::Value) -> Result<String, ToolError> {
        let input: IdentifierInput = parse_input(input)?;
        let product = self.find_by_identifier(input.identifier()?).await?;
        self.report_with_collections(&product).await
    }

    #[instrument(skip_all)]
    pub(super) async fn get_all_product_data(
        &self,
        input: &serde_json::Value,
    ) -> Result<String, ToolError> {
        let input: IdentifierInput = parse_input(input)?;
        let product = self.find_by_identifier(input.identifier()?).await?;
        let metafields = match product.id {
            Some(id) => self.store.metafields(id).await?,
            None => Vec::new(),
        };

        serde_json::to_string_pretty(&FullProductData {
            product: &product,
            metafields: &metafields,
        })
        .map_err(ToolError::from)
    }

    #[instrument(skip_all)]
    pub(super) async fn get_all_products(
        &self,
        input: &serde_json::Value,
    ) -> Result<String, ToolError> {
        let input: ListingInput = parse_input(input)?;
        let order = input.sort_order()?;

        let mut products = fetch_all_products(self.store).await?;
        order.sort(&mut products);

        Ok(render_listing(&products, &input.columns()))
    }

    #[instrument(skip_all)]
    pub(super) async fn search_products(
        &self,
        input: &serde_json::Value,
    ) -> Result<String, ToolError> {
        let input: SearchInput = parse_input(input)?;
        if input.criteria.is_empty() {
            return Err(ToolError::InvalidInput(
                "At least one of title, product_type, vendor, or tags is required.".to_string(),
            ));
        }
        let order = input.listing.sort_order()?;

        let mut matching: Vec<Product> = fetch_all_products(self.store)
            .await?
            .into_iter()
            .filter(|p| input.criteria.matches(p))
            .collect();
        debug!(matches = matching.len(), "Search finished");
        order.sort(&mut matching);

        Ok(render_listing(&matching, &input.listing.columns()))
    }
}
