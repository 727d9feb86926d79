//! Tool argument parsing shared by the product tools.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use shop_agent_core::{Product, ProductField, ProductId};

use crate::error::ToolError;
use crate::generator::{FieldRequest, GenerationPlan};

/// Deserialize tool input into `T`.
pub fn parse_input<T: DeserializeOwned>(input: &serde_json::Value) -> Result<T, ToolError> {
    // Agents sometimes send `null` for tools without required arguments.
    let input = if input.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        input.clone()
    };
    serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

/// Accept strings, numbers and booleans as text.
pub fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(other @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => {
            Ok(Some(other.to_string()))
        }
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

/// A non-blank trimmed value.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a numeric product ID.
pub fn parse_product_id(value: Option<&str>) -> Result<ProductId, ToolError> {
    let value = non_blank(value)
        .ok_or_else(|| ToolError::InvalidInput("product_id is required.".to_string()))?;
    value
        .parse()
        .map_err(|_| ToolError::InvalidInput(format!("'{value}' is not a numeric product ID.")))
}

// =============================================================================
// Field arguments
// =============================================================================

/// Generate flags and literal values accepted by update and bulk update.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FieldArgs {
    pub generate_title: bool,
    pub generate_description: bool,
    pub generate_product_type: bool,
    pub generate_vendor: bool,
    pub generate_tags: bool,
    pub generate_price: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub product_type: Option<String>,
    pub vendor: Option<String>,
    pub tags: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub price: Option<String>,
    pub context: Option<String>,
}

impl FieldArgs {
    /// Requests that generate only where a flag is set.
    pub fn plan(&self) -> GenerationPlan {
        GenerationPlan::new()
            .with(
                ProductField::Title,
                FieldRequest::new(self.generate_title, self.title.clone()),
            )
            .with(
                ProductField::Description,
                FieldRequest::new(self.generate_description, self.description.clone()),
            )
            .with(
                ProductField::ProductType,
                FieldRequest::new(self.generate_product_type, self.product_type.clone()),
            )
            .with(
                ProductField::Tags,
                FieldRequest::new(self.generate_tags, self.tags.clone()),
            )
            .with(
                ProductField::Price,
                FieldRequest::new(self.generate_price, self.price.clone()),
            )
            .with(
                ProductField::Vendor,
                FieldRequest::new(self.generate_vendor, self.vendor.clone()),
            )
    }

    pub fn context(&self) -> Option<&str> {
        non_blank(self.context.as_deref())
    }
}

// =============================================================================
// Search criteria
// =============================================================================

/// Product filters. Every criterion given must match.
///
/// Text criteria are case-insensitive substrings; `tags` is a comma-separated
/// list of tags that must all be on the product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub title: Option<String>,
    pub product_type: Option<String>,
    pub vendor: Option<String>,
    pub tags: Option<String>,
}

impl SearchCriteria {
    /// Whether no criterion was given.
    pub fn is_empty(&self) -> bool {
        [&self.title, &self.product_type, &self.vendor, &self.tags]
            .iter()
            .all(|c| non_blank(c.as_deref()).is_none())
    }

    pub fn matches(&self, product: &Product) -> bool {
        let contains = |criterion: &Option<String>, value: &str| {
            non_blank(criterion.as_deref())
                .is_none_or(|needle| value.to_lowercase().contains(&needle.to_lowercase()))
        };

        contains(&self.title, &product.title)
            && contains(&self.product_type, &product.product_type)
            && contains(&self.vendor, &product.vendor)
            && self.tags_match(product)
    }

    fn tags_match(&self, product: &Product) -> bool {
        let Some(wanted) = non_blank(self.tags.as_deref()) else {
            return true;
        };
        let have: Vec<String> = product
            .tag_list()
            .into_iter()
            .map(str::to_lowercase)
            .collect();

        wanted
            .split(',')
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .all(|tag| have.contains(&tag))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product(title: &str, tags: &str) -> Product {
        Product {
            title: title.to_string(),
            product_type: "Widget".to_string(),
            vendor: "Acme".to_string(),
            tags: tags.to_string(),
            ..Product::default()
        }
    }

    #[test]
    fn test_price_accepts_numbers() {
        let args: FieldArgs = parse_input(&json!({"price": 12.5, "generate_title": true})).unwrap();
        assert_eq!(args.price.as_deref(), Some("12.5"));
        assert!(args.generate_title);
        assert!(!args.generate_vendor);
    }

    #[test]
    fn test_wrong_type_is_invalid_input() {
        let err = parse_input::<FieldArgs>(&json!({"generate_title": "yes"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[test]
    fn test_null_input_is_empty_object() {
        let criteria: SearchCriteria = parse_input(&serde_json::Value::Null).unwrap();
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_parse_product_id() {
        assert_eq!(parse_product_id(Some(" 42 ")).unwrap(), ProductId::new(42));
        assert!(matches!(
            parse_product_id(Some("Blue Widget")),
            Err(ToolError::InvalidInput(_))
        ));
        assert!(matches!(parse_product_id(None), Err(ToolError::InvalidInput(_))));
    }

    #[test]
    fn test_plan_from_flags() {
        let args = FieldArgs {
            generate_vendor: true,
            title: Some("New Title".to_string()),
            ..FieldArgs::default()
        };
        let plan = args.plan();

        assert!(plan.request(ProductField::Vendor).generate);
        assert_eq!(plan.request(ProductField::Title).literal(), Some("New Title"));
        assert!(!plan.request(ProductField::Price).generate);
    }

    #[test]
    fn test_criteria_substring_and_case() {
        let criteria = SearchCriteria {
            title: Some("WIDGET".to_string()),
            vendor: Some("ac".to_string()),
            ..SearchCriteria::default()
        };
        assert!(criteria.matches(&product("Blue Widget", "")));
        assert!(!criteria.matches(&product("Red Mug", "")));
    }

    #[test]
    fn test_criteria_requires_all_tags() {
        let criteria = SearchCriteria {
            tags: Some("Blue, sturdy".to_string()),
            ..SearchCriteria::default()
        };
        assert!(criteria.matches(&product("Widget", "blue, sturdy, metal")));
        assert!(!criteria.matches(&product("Widget", "blue, metal")));
        assert!(!criteria.matches(&product("Widget", "navy-blue, sturdy")));
    }
}
