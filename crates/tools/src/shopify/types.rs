//! Wire types for the Shopify REST Admin API.
//!
//! These mirror the JSON bodies of the product, metafield and collection
//! endpoints. Domain code works with [`shop_agent_core::Product`] instead;
//! see `conversions` for the mapping.

use serde::{Deserialize, Serialize};

// =============================================================================
// Products
// =============================================================================

/// Product resource as sent and received over REST.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Read-only timestamps are never sent back.
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub variants: Vec<RestVariant>,
}

/// Variant resource. Prices travel as decimal strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestVariant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

/// `{"product": {...}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductEnvelope {
    pub product: RestProduct,
}

/// `{"products": [...]}`
#[derive(Debug, Deserialize)]
pub struct ProductsEnvelope {
    #[serde(default)]
    pub products: Vec<RestProduct>,
}

// =============================================================================
// Metafields
// =============================================================================

/// Metafield resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestMetafield {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub namespace: String,
    pub key: String,
    /// Scalar metafields come back as strings, numbers or booleans.
    pub value: serde_json::Value,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// `{"metafield": {...}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct MetafieldEnvelope {
    pub metafield: RestMetafield,
}

/// `{"metafields": [...]}`
#[derive(Debug, Deserialize)]
pub struct MetafieldsEnvelope {
    #[serde(default)]
    pub metafields: Vec<RestMetafield>,
}

// =============================================================================
// Collections
// =============================================================================

/// The only collection attribute the tools read.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionTitle {
    pub title: String,
}

/// `{"custom_collections": [...]}`
#[derive(Debug, Deserialize)]
pub struct CustomCollectionsEnvelope {
    #[serde(default)]
    pub custom_collections: Vec<CollectionTitle>,
}

/// `{"smart_collections": [...]}`
#[derive(Debug, Deserialize)]
pub struct SmartCollectionsEnvelope {
    #[serde(default)]
    pub smart_collections: Vec<CollectionTitle>,
}

// =============================================================================
// Errors
// =============================================================================

/// Body of a 4xx response. `errors` is a string, a list of strings, or a map
/// of attribute name to messages.
#[derive(Debug, Deserialize)]
pub struct ErrorsEnvelope {
    pub errors: serde_json::Value,
}

impl ErrorsEnvelope {
    /// Flatten into full messages such as `Title can't be blank`.
    #[must_use]
    pub fn full_messages(&self) -> Vec<String> {
        match &self.errors {
            serde_json::Value::String(message) => vec![message.clone()],
            serde_json::Value::Array(items) => items.iter().map(value_text).collect(),
            serde_json::Value::Object(fields) => fields
                .iter()
                .flat_map(|(attribute, messages)| {
                    let messages: Vec<String> = match messages {
                        serde_json::Value::Array(items) => items.iter().map(value_text).collect(),
                        other => vec![value_text(other)],
                    };
                    messages
                        .into_iter()
                        .map(move |message| full_message(attribute, &message))
                })
                .collect(),
            other => vec![value_text(other)],
        }
    }
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// `base` errors are already complete sentences.
fn full_message(attribute: &str, message: &str) -> String {
    if attribute == "base" {
        return message.to_string();
    }
    let human = attribute.replace('_', " ");
    let mut chars = human.chars();
    let capitalized = chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect::<String>()
    });
    format!("{capitalized} {message}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn messages(json: &str) -> Vec<String> {
        serde_json::from_str::<ErrorsEnvelope>(json).unwrap().full_messages()
    }

    #[test]
    fn test_full_messages_map() {
        assert_eq!(
            messages(r#"{"errors": {"title": ["can't be blank"], "product_type": ["is too long"]}}"#),
            vec!["Product type is too long", "Title can't be blank"]
        );
    }

    #[test]
    fn test_full_messages_base_and_string() {
        assert_eq!(
            messages(r#"{"errors": {"base": ["Store is frozen"]}}"#),
            vec!["Store is frozen"]
        );
        assert_eq!(messages(r#"{"errors": "Not Found"}"#), vec!["Not Found"]);
        assert_eq!(
            messages(r#"{"errors": ["first", "second"]}"#),
            vec!["first", "second"]
        );
    }

    #[test]
    fn test_product_serialization_skips_read_only() {
        let product = RestProduct {
            title: "Mug".to_string(),
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
            variants: vec![RestVariant {
                price: Some("5.00".to_string()),
                ..RestVariant::default()
            }],
            ..RestProduct::default()
        };
        let json = serde_json::to_value(ProductEnvelope { product }).unwrap();
        assert!(json["product"].get("id").is_none());
        assert!(json["product"].get("created_at").is_none());
        assert_eq!(json["product"]["variants"][0]["price"], "5.00");
    }

    #[test]
    fn test_product_deserializes_null_body() {
        let json = r#"{"product": {"id": 1, "title": "Mug", "body_html": null, "variants": []}}"#;
        let envelope: ProductEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.product.id, Some(1));
        assert!(envelope.product.body_html.is_none());
    }
}
