//! Product model shared by the store client, the tools, and the formatter.

use serde::{Deserialize, Serialize};

use super::id::{MetafieldId, ProductId, VariantId};
use super::price::Price;

/// A product as stored in Shopify.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID (`None` until the product has been created).
    pub id: Option<ProductId>,
    /// Product title.
    pub title: String,
    /// HTML description.
    pub body_html: String,
    /// Product type/category.
    pub product_type: String,
    /// Vendor name.
    pub vendor: String,
    /// Comma-separated tags.
    pub tags: String,
    /// URL handle.
    pub handle: Option<String>,
    /// Product status (`active`, `draft`, `archived`).
    pub status: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<String>,
    /// Last update timestamp.
    pub updated_at: Option<String>,
    /// Variants in store order.
    pub variants: Vec<Variant>,
}

impl Product {
    /// Price of the first variant, if any.
    #[must_use]
    pub fn first_price(&self) -> Option<Price> {
        self.variants.first().and_then(|v| v.price)
    }

    /// Set the price of the first variant, creating one if the product has none.
    pub fn set_first_price(&mut self, price: Price) {
        if let Some(variant) = self.variants.first_mut() {
            variant.price = Some(price);
        } else {
            self.variants.push(Variant {
                price: Some(price),
                ..Variant::default()
            });
        }
    }

    /// Tags split on commas, trimmed, empty entries removed.
    #[must_use]
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// A product variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant ID (`None` for variants not yet created).
    pub id: Option<VariantId>,
    /// Variant title (combination of option values).
    pub title: String,
    /// SKU code.
    pub sku: Option<String>,
    /// Current price.
    pub price: Option<Price>,
}

/// A metafield attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metafield {
    /// Metafield ID (`None` until created).
    pub id: Option<MetafieldId>,
    /// Namespace grouping related keys.
    pub namespace: String,
    /// Key within the namespace.
    pub key: String,
    /// Value rendered as text.
    pub value: String,
    /// Shopify metafield type (e.g. `multi_line_text_field`).
    #[serde(rename = "type")]
    pub kind: String,
}

impl Metafield {
    /// Create a metafield that has not been saved yet.
    #[must_use]
    pub fn new(namespace: &str, key: &str, value: &str, kind: &str) -> Self {
        Self {
            id: None,
            namespace: namespace.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            kind: kind.to_string(),
        }
    }

    /// `namespace.key` label used in reports.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}.{}", self.namespace, self.key)
    }
}
