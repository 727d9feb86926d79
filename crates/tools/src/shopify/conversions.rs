//! Conversions between REST wire types and the core product model.

use shop_agent_core::{Metafield, MetafieldId, Price, Product, ProductId, Variant, VariantId};
use tracing::warn;

use super::types::{RestMetafield, RestProduct, RestVariant};

// =============================================================================
// Products
// =============================================================================

pub fn convert_product(product: RestProduct) -> Product {
    Product {
        id: product.id.map(ProductId::new),
        title: product.title,
        body_html: product.body_html.unwrap_or_default(),
        product_type: product.product_type,
        vendor: product.vendor,
        tags: product.tags,
        handle: product.handle,
        status: product.status,
        created_at: product.created_at,
        updated_at: product.updated_at,
        variants: product.variants.into_iter().map(convert_variant).collect(),
    }
}

fn convert_variant(variant: RestVariant) -> Variant {
    let price = variant.price.and_then(|raw| match Price::parse(&raw) {
        Ok(price) => Some(price),
        Err(e) => {
            warn!(variant_id = ?variant.id, error = %e, "Ignoring unreadable variant price");
            None
        }
    });

    Variant {
        id: variant.id.map(VariantId::new),
        title: variant.title.unwrap_or_default(),
        sku: variant.sku,
        price,
    }
}

/// Build the request body for a create or update.
///
/// Every variant is sent with its ID so that updates keep them all.
pub fn to_rest_product(product: &Product) -> RestProduct {
    RestProduct {
        id: product.id.map(u64::from),
        title: product.title.clone(),
        body_html: Some(product.body_html.clone()),
        product_type: product.product_type.clone(),
        vendor: product.vendor.clone(),
        tags: product.tags.clone(),
        handle: product.handle.clone(),
        status: product.status.clone(),
        created_at: None,
        updated_at: None,
        variants: product.variants.iter().map(to_rest_variant).collect(),
    }
}

fn to_rest_variant(variant: &Variant) -> RestVariant {
    RestVariant {
        id: variant.id.map(u64::from),
        title: (!variant.title.is_empty()).then(|| variant.title.clone()),
        sku: variant.sku.clone(),
        price: variant.price.map(|p| p.amount().to_string()),
    }
}

// =============================================================================
// Metafields
// =============================================================================

pub fn convert_metafield(metafield: RestMetafield) -> Metafield {
    let value = match metafield.value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    };

    Metafield {
        id: metafield.id.map(MetafieldId::new),
        namespace: metafield.namespace,
        key: metafield.key,
        value,
        kind: metafield.kind,
    }
}

pub fn to_rest_metafield(metafield: &Metafield) -> RestMetafield {
    RestMetafield {
        id: metafield.id.map(u64::from),
        namespace: metafield.namespace.clone(),
        key: metafield.key.clone(),
        value: serde_json::Value::String(metafield.value.clone()),
        kind: metafield.kind.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_product_reads_prices() {
        let rest = RestProduct {
            id: Some(7),
            title: "Mug".to_string(),
            body_html: None,
            variants: vec![
                RestVariant {
                    id: Some(70),
                    price: Some("12.50".to_string()),
                    ..RestVariant::default()
                },
                RestVariant {
                    id: Some(71),
                    price: Some("n/a".to_string()),
                    ..RestVariant::default()
                },
            ],
            ..RestProduct::default()
        };

        let product = convert_product(rest);

        assert_eq!(product.id, Some(ProductId::new(7)));
        assert_eq!(product.body_html, "");
        assert_eq!(product.first_price(), Some(Price::parse("12.50").unwrap()));
        assert!(product.variants[1].price.is_none());
    }

    #[test]
    fn test_to_rest_product_keeps_variant_ids() {
        let product = Product {
            id: Some(ProductId::new(7)),
            variants: vec![
                Variant {
                    id: Some(VariantId::new(70)),
                    price: Some(Price::parse("9").unwrap()),
                    ..Variant::default()
                },
                Variant {
                    id: Some(VariantId::new(71)),
                    ..Variant::default()
                },
            ],
            ..Product::default()
        };

        let rest = to_rest_product(&product);

        assert_eq!(rest.id, Some(7));
        assert_eq!(rest.variants.len(), 2);
        assert_eq!(rest.variants[0].id, Some(70));
        assert_eq!(rest.variants[0].price.as_deref(), Some("9"));
        assert!(rest.variants[1].price.is_none());
    }

    #[test]
    fn test_convert_metafield_non_string_value() {
        let rest = RestMetafield {
            id: Some(3),
            namespace: "custom".to_string(),
            key: "count".to_string(),
            value: serde_json::json!(12),
            kind: "number_integer".to_string(),
        };
        let field = convert_metafield(rest);
        assert_eq!(field.value, "12");
        assert_eq!(field.id, Some(MetafieldId::new(3)));
    }
}
