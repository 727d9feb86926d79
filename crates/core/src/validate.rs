//! Field constraints checked before anything is written to the store.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::draft::{ProductDraft, ProductField};
use crate::normalize::html_text_content;
use crate::types::{Price, PriceError, Product, price::parse_amount};

static PLAIN_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[a-zA-Z0-9\s\-.,!?'";:/]*$"#).expect("Invalid regex")
});

/// How a field's value is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Restricted character set plus a length ceiling.
    PlainText,
    /// Markup whose text content must be non-empty and within the ceiling.
    Html,
    /// A non-negative decimal number.
    Price,
    /// Any characters, length ceiling only.
    FreeText,
}

/// Why a value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    Required,
    TooLong,
    BadCharacters,
    NotNumeric,
    Negative,
    EmptyHtml,
}

impl ValidationReason {
    /// Stable reason code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::TooLong => "too_long",
            Self::BadCharacters => "bad_characters",
            Self::NotNumeric => "not_numeric",
            Self::Negative => "negative",
            Self::EmptyHtml => "empty_html",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Required => "is required.",
            Self::TooLong => "is too long.",
            Self::BadCharacters => "contains inappropriate characters.",
            Self::NotNumeric => "must be a float.",
            Self::Negative => "must be non-negative.",
            Self::EmptyHtml => "must contain text.",
        })
    }
}

/// A rejected field value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation error in field '{field}' with value '{value}': {reason}")]
pub struct ValidationError {
    pub field: String,
    pub value: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: &str, value: &str, reason: ValidationReason) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
            reason,
        }
    }
}

/// Check a single value.
///
/// Empty values pass unless `required` is set. Returns the value unchanged.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `field_name`, the value and the first
/// failed constraint.
pub fn validate<'a>(
    value: &'a str,
    max_length: usize,
    field_name: &str,
    kind: FieldKind,
    required: bool,
) -> Result<&'a str, ValidationError> {
    let fail = |reason| {
        warn!(field = field_name, reason = ValidationReason::code(reason), "Field rejected");
        Err(ValidationError::new(field_name, value, reason))
    };

    if value.trim().is_empty() {
        return if required {
            fail(ValidationReason::Required)
        } else {
            Ok(value)
        };
    }

    match kind {
        FieldKind::PlainText => {
            if !PLAIN_TEXT_RE.is_match(value) {
                return fail(ValidationReason::BadCharacters);
            }
            if value.chars().count() > max_length {
                return fail(ValidationReason::TooLong);
            }
        }
        FieldKind::Html => {
            let text = html_text_content(value);
            if text.is_empty() {
                return fail(ValidationReason::EmptyHtml);
            }
            if text.chars().count() > max_length {
                return fail(ValidationReason::TooLong);
            }
        }
        FieldKind::Price => match parse_amount(value) {
            Err(_) => return fail(ValidationReason::NotNumeric),
            Ok(amount) if Price::new(amount).is_err() => {
                return fail(ValidationReason::Negative);
            }
            Ok(_) => {}
        },
        FieldKind::FreeText => {
            if value.chars().count() > max_length {
                return fail(ValidationReason::TooLong);
            }
        }
    }

    Ok(value)
}

/// Parse a price that has already passed [`validate`] as [`FieldKind::Price`].
///
/// # Errors
///
/// Returns `not_numeric` or `negative` if the value was not validated first.
pub fn validate_price(value: &str, field_name: &str) -> Result<Price, ValidationError> {
    Price::parse(value).map_err(|e| {
        let reason = match e {
            PriceError::NotNumeric(_) => ValidationReason::NotNumeric,
            PriceError::Negative(_) => ValidationReason::Negative,
        };
        ValidationError::new(field_name, value, reason)
    })
}

// =============================================================================
// Product-level validation
// =============================================================================

/// Constraint set for one product field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: ProductField,
    pub max_length: usize,
    pub kind: FieldKind,
    pub required: bool,
}

/// Rules in the order they are checked.
pub const FIELD_RULES: [FieldRule; 6] = [
    FieldRule {
        field: ProductField::Title,
        max_length: 255,
        kind: FieldKind::FreeText,
        required: true,
    },
    FieldRule {
        field: ProductField::Description,
        max_length: 65_535,
        kind: FieldKind::Html,
        required: true,
    },
    FieldRule {
        field: ProductField::ProductType,
        max_length: 255,
        kind: FieldKind::PlainText,
        required: true,
    },
    FieldRule {
        field: ProductField::Tags,
        max_length: 255,
        kind: FieldKind::PlainText,
        required: false,
    },
    FieldRule {
        field: ProductField::Price,
        max_length: 255,
        kind: FieldKind::Price,
        required: true,
    },
    FieldRule {
        field: ProductField::Vendor,
        max_length: 255,
        kind: FieldKind::PlainText,
        required: true,
    },
];

/// Whether absent fields must be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    /// Every required field must be present.
    Create,
    /// Absent fields are left alone.
    Update,
}

/// A draft whose present fields all passed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub product_type: Option<String>,
    pub tags: Option<String>,
    pub price: Option<Price>,
    pub vendor: Option<String>,
}

impl ValidatedDraft {
    /// Copy the validated fields onto a product.
    ///
    /// The price goes to the first variant; other variants are untouched.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(title) = &self.title {
            product.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            product.body_html.clone_from(description);
        }
        if let Some(product_type) = &self.product_type {
            product.product_type.clone_from(product_type);
        }
        if let Some(tags) = &self.tags {
            product.tags.clone_from(tags);
        }
        if let Some(vendor) = &self.vendor {
            product.vendor.clone_from(vendor);
        }
        if let Some(price) = self.price {
            product.set_first_price(price);
        }
    }
}

/// Validate a draft field by field, stopping at the first failure.
///
/// Order: title, description, product type, tags, price, vendor.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate_draft(
    draft: &ProductDraft,
    mode: DraftMode,
) -> Result<ValidatedDraft, ValidationError> {
    let mut validated = ValidatedDraft::default();

    for rule in FIELD_RULES {
        let value = match (draft.get(rule.field), mode) {
            (Some(value), _) => value,
            (None, DraftMode::Update) => continue,
            (None, DraftMode::Create) => "",
        };
        let label = rule.field.label();
        let value = validate(value, rule.max_length, label, rule.kind, rule.required)?;

        if value.trim().is_empty() {
            // Only optional fields get here.
            continue;
        }

        match rule.field {
            ProductField::Title => validated.title = Some(value.to_string()),
            ProductField::Description => validated.description = Some(value.to_string()),
            ProductField::ProductType => validated.product_type = Some(value.to_string()),
            ProductField::Tags => validated.tags = Some(value.to_string()),
            ProductField::Price => validated.price = Some(validate_price(value, label)?),
            ProductField::Vendor => validated.vendor = Some(value.to_string()),
        }
    }

    Ok(validated)
}
