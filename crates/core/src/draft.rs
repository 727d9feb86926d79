//! Per-invocation product attributes and the notes kept when generated
//! values had to be cut down.
//!
//! A [`ProductDraft`] holds the six editable fields as text while they are
//! being resolved. Prices stay textual until [`crate::validate`] turns them
//! into a [`crate::Price`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Metafield, Product};

/// Metafield namespace holding generation notes.
pub const NOTES_NAMESPACE: &str = "ai_metadata";
/// Metafield key holding generation notes.
pub const NOTES_KEY: &str = "ai_results";
/// Metafield type used for generation notes.
pub const NOTES_TYPE: &str = "multi_line_text_field";

/// One of the product fields the tools can set or generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    Title,
    Description,
    ProductType,
    Tags,
    Price,
    Vendor,
}

impl ProductField {
    /// Every field, in resolution order.
    pub const ALL: [Self; 6] = [
        Self::Title,
        Self::Description,
        Self::ProductType,
        Self::Tags,
        Self::Price,
        Self::Vendor,
    ];

    /// Machine name (`product_type`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::ProductType => "product_type",
            Self::Tags => "tags",
            Self::Price => "price",
            Self::Vendor => "vendor",
        }
    }

    /// Human label used in validation messages (`Product type`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Description => "Description",
            Self::ProductType => "Product type",
            Self::Tags => "Tags",
            Self::Price => "Price",
            Self::Vendor => "Vendor",
        }
    }

    /// Noun used when describing the field inside a prompt.
    #[must_use]
    pub const fn prompt_name(self) -> &'static str {
        match self {
            Self::ProductType => "type",
            other => other.as_str(),
        }
    }

    /// Prefix of the report line for a note about this field.
    #[must_use]
    pub const fn note_label(self) -> &'static str {
        match self {
            Self::Title => "Title Information: ",
            Self::Description => "Description Information: ",
            Self::ProductType => "Product Type Information: ",
            Self::Tags => "Additional Tags: ",
            Self::Price => "Pricing Information: ",
            Self::Vendor => "Vendor Information: ",
        }
    }

    // Notes are always listed type, vendor, tags, price.
    const fn note_rank(self) -> u8 {
        match self {
            Self::ProductType => 0,
            Self::Vendor => 1,
            Self::Tags => 2,
            Self::Price => 3,
            Self::Title => 4,
            Self::Description => 5,
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product attributes for a single tool invocation.
///
/// `None` means the attribute is unknown. Descriptions are HTML, tags are a
/// comma-separated list, and the price is unparsed text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub product_type: Option<String>,
    pub tags: Option<String>,
    pub price: Option<String>,
    pub vendor: Option<String>,
}

impl ProductDraft {
    /// Seed a draft from a stored product.
    ///
    /// Empty store values are treated as unknown.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        let known = |value: &str| (!value.trim().is_empty()).then(|| value.to_string());
        Self {
            title: known(&product.title),
            description: known(&product.body_html),
            product_type: known(&product.product_type),
            tags: known(&product.tags),
            price: product.first_price().map(|p| p.amount().to_string()),
            vendor: known(&product.vendor),
        }
    }

    /// Current value of a field.
    #[must_use]
    pub fn get(&self, field: ProductField) -> Option<&str> {
        match field {
            ProductField::Title => self.title.as_deref(),
            ProductField::Description => self.description.as_deref(),
            ProductField::ProductType => self.product_type.as_deref(),
            ProductField::Tags => self.tags.as_deref(),
            ProductField::Price => self.price.as_deref(),
            ProductField::Vendor => self.vendor.as_deref(),
        }
    }

    /// Current value of a field if it is non-blank.
    #[must_use]
    pub fn known(&self, field: ProductField) -> Option<&str> {
        self.get(field).filter(|v| !v.trim().is_empty())
    }

    /// Replace the value of a field.
    pub fn set(&mut self, field: ProductField, value: impl Into<String>) {
        let slot = match field {
            ProductField::Title => &mut self.title,
            ProductField::Description => &mut self.description,
            ProductField::ProductType => &mut self.product_type,
            ProductField::Tags => &mut self.tags,
            ProductField::Price => &mut self.price,
            ProductField::Vendor => &mut self.vendor,
        };
        *slot = Some(value.into());
    }

    /// Only the fields whose value differs from `before`.
    #[must_use]
    pub fn changes_from(&self, before: &Self) -> Self {
        let mut changes = Self::default();
        for field in ProductField::ALL {
            if let Some(value) = self.get(field).filter(|&v| before.get(field) != Some(v)) {
                changes.set(field, value);
            }
        }
        changes
    }

    /// Fields that hold a value, in resolution order.
    #[must_use]
    pub fn present_fields(&self) -> Vec<ProductField> {
        ProductField::ALL
            .into_iter()
            .filter(|&field| self.get(field).is_some())
            .collect()
    }
}

/// Result of resolving a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// Value to store.
    pub value: String,
    /// Raw text kept aside when the value was truncated or disambiguated.
    pub overflow: Option<String>,
}

impl GenerationOutcome {
    /// An outcome with nothing left over.
    #[must_use]
    pub fn clean(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            overflow: None,
        }
    }

    /// An outcome that keeps `overflow` as a note.
    #[must_use]
    pub fn with_overflow(value: impl Into<String>, overflow: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            overflow: Some(overflow.into()),
        }
    }
}

/// Text that did not fit into a field, labelled by the field it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowNote {
    pub field: ProductField,
    pub text: String,
}

impl OverflowNote {
    #[must_use]
    pub fn new(field: ProductField, text: impl Into<String>) -> Self {
        Self {
            field,
            text: text.into(),
        }
    }
}

impl fmt::Display for OverflowNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.field.note_label(), self.text)
    }
}

/// Order notes for display: product type, vendor, tags, price.
#[must_use]
pub fn ordered_notes(notes: &[OverflowNote]) -> Vec<&OverflowNote> {
    let mut ordered: Vec<&OverflowNote> = notes.iter().collect();
    ordered.sort_by_key(|note| note.field.note_rank());
    ordered
}

/// Join notes into the single text block stored on the product.
///
/// Returns `None` when there is nothing to store.
#[must_use]
pub fn join_notes(notes: &[OverflowNote]) -> Option<String> {
    if notes.is_empty() {
        return None;
    }
    let joined = ordered_notes(notes)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n");
    Some(joined)
}

/// Build the `ai_metadata.ai_results` metafield for a set of notes.
#[must_use]
pub fn notes_metafield(notes: &[OverflowNote]) -> Option<Metafield> {
    join_notes(notes).map(|value| Metafield::new(NOTES_NAMESPACE, NOTES_KEY, &value, NOTES_TYPE))
}
