//! Field resolution: use the caller's literal, generate with the language
//! model, or keep the stored value.
//!
//! Fields are resolved in [`ProductField::ALL`] order so that later prompts
//! see values chosen for earlier fields. Generated replies are untrusted and
//! go through per-field post-processing:
//!
//! - title: title case with small words lowered
//! - description: one `<p>` per non-blank line
//! - product type: cut to 255 characters, the full reply kept as a note
//! - tags: one tag per line, whole tags only, the rest kept as a note
//! - price: ranges are averaged or asked again, then parsed
//! - vendor: lists and long replies are asked again

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use shop_agent_core::normalize::{
    MAX_PRODUCT_TYPE_LEN, MAX_TAGS_LEN, html_text_content, html_to_plain_text, looks_like_html,
    normalize_title, paragraphs_to_html, trim_product_type, trim_tags,
};
use shop_agent_core::validate::validate_price;
use shop_agent_core::{GenerationOutcome, OverflowNote, ProductDraft, ProductField, ValidationError};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::completion::{CompletionError, TextCompleter};

/// Bare integers in a price reply.
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+\b").expect("Invalid regex"));

/// Replies with more words than this are treated as ambiguous.
const MAX_SCALAR_WORDS: usize = 5;

// =============================================================================
// Errors
// =============================================================================

/// Failure to produce a value for a field.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The model replied with nothing.
    #[error("AI failed to generate information for task: {prompt}")]
    Empty {
        /// Field being generated.
        field: ProductField,
        /// Prompt that got no answer.
        prompt: String,
    },

    /// The completion backend failed.
    #[error("Failed to generate {field}: {source}")]
    Completion {
        /// Field being generated.
        field: ProductField,
        /// Backend error.
        source: CompletionError,
    },

    /// The final generated value is unusable.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Requests
// =============================================================================

/// What the caller asked for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRequest {
    /// Generate a value when no literal is given.
    pub generate: bool,
    /// Value supplied by the caller.
    pub literal: Option<String>,
}

impl FieldRequest {
    #[must_use]
    pub const fn new(generate: bool, literal: Option<String>) -> Self {
        Self { generate, literal }
    }

    /// The literal, if it has any content.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        self.literal
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Per-field requests for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationPlan {
    title: FieldRequest,
    description: FieldRequest,
    product_type: FieldRequest,
    tags: FieldRequest,
    price: FieldRequest,
    vendor: FieldRequest,
}

impl GenerationPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request for a field.
    #[must_use]
    pub fn with(mut self, field: ProductField, request: FieldRequest) -> Self {
        *self.request_mut(field) = request;
        self
    }

    /// The request for a field.
    #[must_use]
    pub const fn request(&self, field: ProductField) -> &FieldRequest {
        match field {
            ProductField::Title => &self.title,
            ProductField::Description => &self.description,
            ProductField::ProductType => &self.product_type,
            ProductField::Tags => &self.tags,
            ProductField::Price => &self.price,
            ProductField::Vendor => &self.vendor,
        }
    }

    const fn request_mut(&mut self, field: ProductField) -> &mut FieldRequest {
        match field {
            ProductField::Title => &mut self.title,
            ProductField::Description => &mut self.description,
            ProductField::ProductType => &mut self.product_type,
            ProductField::Tags => &mut self.tags,
            ProductField::Price => &mut self.price,
            ProductField::Vendor => &mut self.vendor,
        }
    }

    /// Whether any field would change.
    #[must_use]
    pub fn touches_anything(&self) -> bool {
        ProductField::ALL.iter().any(|&field| {
            let request = self.request(field);
            request.generate || request.literal().is_some()
        })
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Resolves product fields against a [`TextCompleter`].
pub struct FieldGenerator<'a> {
    completer: &'a dyn TextCompleter,
}

impl<'a> FieldGenerator<'a> {
    #[must_use]
    pub const fn new(completer: &'a dyn TextCompleter) -> Self {
        Self { completer }
    }

    /// Resolve every field of `plan` into `draft`, in order.
    ///
    /// Returns the overflow notes collected along the way.
    ///
    /// # Errors
    ///
    /// Stops at the first field that cannot be resolved.
    #[instrument(skip_all)]
    pub async fn resolve_all(
        &self,
        draft: &mut ProductDraft,
        plan: &GenerationPlan,
        context: Option<&str>,
    ) -> Result<Vec<OverflowNote>, GenerationError> {
        let mut notes = Vec::new();

        for field in ProductField::ALL {
            let request = plan.request(field);
            let outcome = self
                .resolve(field, draft, request.generate, request.literal(), context)
                .await?;

            if let Some(outcome) = outcome {
                if let Some(text) = outcome.overflow {
                    notes.push(OverflowNote::new(field, text));
                }
                draft.set(field, outcome.value);
            }
        }

        Ok(notes)
    }

    /// Resolve one field.
    ///
    /// A non-empty literal always wins. Without one, the field is generated
    /// when `generate` is set and kept otherwise. `Ok(None)` means keep the
    /// draft's current value untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the model fails or replies with nothing,
    /// or if a price cannot be parsed.
    #[instrument(skip(self, draft, literal, context), fields(field = %field))]
    pub async fn resolve(
        &self,
        field: ProductField,
        draft: &ProductDraft,
        generate: bool,
        literal: Option<&str>,
        context: Option<&str>,
    ) -> Result<Option<GenerationOutcome>, GenerationError> {
        let literal = literal.map(str::trim).filter(|v| !v.is_empty());

        match (literal, generate) {
            (Some(literal), _) => Ok(Some(normalize_literal(field, literal))),
            (None, true) => self.generate(field, draft, context).await.map(Some),
            (None, false) => Ok(None),
        }
    }

    async fn generate(
        &self,
        field: ProductField,
        draft: &ProductDraft,
        context: Option<&str>,
    ) -> Result<GenerationOutcome, GenerationError> {
        info!(field = %field, "Generating field");
        let prompt = build_prompt(field, draft, context);
        let reply = self.ask(field, &prompt).await?;

        let outcome = match field {
            ProductField::Title => GenerationOutcome::clean(normalize_title(&reply)),
            ProductField::Description => GenerationOutcome::clean(paragraphs_to_html(&reply)),
            ProductField::ProductType => {
                outcome_from(trim_product_type(&reply, MAX_PRODUCT_TYPE_LEN))
            }
            ProductField::Tags => outcome_from(trim_tags(&reply, MAX_TAGS_LEN)),
            ProductField::Price => self.settle_price(&prompt, reply).await?,
            ProductField::Vendor => self.settle_vendor(&prompt, reply).await?,
        };

        if outcome.overflow.is_some() {
            info!(field = %field, "Generated value kept an overflow note");
        }
        Ok(outcome)
    }

    /// Reduce a price reply to a single amount.
    async fn settle_price(
        &self,
        prompt: &str,
        reply: String,
    ) -> Result<GenerationOutcome, GenerationError> {
        let mut overflow = None;
        let mut value = reply;

        if is_ambiguous_price(&value) {
            warn!(reply = %value, "Ambiguous price reply");
            let numbers: Vec<&str> = NUMBER_RE.find_iter(&value).map(|m| m.as_str()).collect();
            let settled = match numbers.as_slice() {
                [low, high] => average(low, high),
                _ => None,
            };
            let settled = match settled {
                Some(average) => average,
                None => {
                    let follow_up = format!(
                        "Based on the previous information, {prompt} Select a specific price that \
                         we should start selling our product at. (Please reply in a single \
                         specific numeric value only.)"
                    );
                    self.ask(ProductField::Price, &follow_up).await?
                }
            };
            overflow = Some(std::mem::replace(&mut value, settled));
        }

        let amount = value.trim();
        let amount = amount.strip_prefix('$').unwrap_or(amount).trim();
        let price = validate_price(amount, ProductField::Price.label())?;

        Ok(GenerationOutcome {
            value: price.amount().to_string(),
            overflow,
        })
    }

    /// Reduce a vendor reply to a single short name.
    async fn settle_vendor(
        &self,
        prompt: &str,
        reply: String,
    ) -> Result<GenerationOutcome, GenerationError> {
        if !is_ambiguous_vendor(&reply) {
            return Ok(GenerationOutcome::clean(reply));
        }

        warn!(reply = %reply, "Ambiguous vendor reply");
        let follow_up = format!(
            "Based on the previous information, {prompt} (Please reply in less than 5 words.)"
        );
        let vendor = self.ask(ProductField::Vendor, &follow_up).await?;
        Ok(GenerationOutcome::with_overflow(vendor, reply))
    }

    /// One completion call. Blank replies are errors.
    async fn ask(&self, field: ProductField, prompt: &str) -> Result<String, GenerationError> {
        let reply = self
            .completer
            .complete(prompt)
            .await
            .map_err(|source| {
                error!(field = %field, error = %source, "Completion failed");
                GenerationError::Completion { field, source }
            })?;

        let reply = reply.trim();
        if reply.is_empty() {
            error!(field = %field, "Empty completion");
            return Err(GenerationError::Empty {
                field,
                prompt: prompt.to_string(),
            });
        }
        Ok(reply.to_string())
    }
}

// =============================================================================
// Literals
// =============================================================================

/// Bring a caller-supplied value into stored form.
fn normalize_literal(field: ProductField, literal: &str) -> GenerationOutcome {
    match field {
        ProductField::Title => GenerationOutcome::clean(normalize_title(literal)),
        ProductField::Description if looks_like_html(literal) => {
            GenerationOutcome::clean(literal)
        }
        ProductField::Description => GenerationOutcome::clean(paragraphs_to_html(literal)),
        ProductField::ProductType => outcome_from(trim_product_type(literal, MAX_PRODUCT_TYPE_LEN)),
        ProductField::Tags => outcome_from(trim_tags(&literal.replace(',', "\n"), MAX_TAGS_LEN)),
        ProductField::Price => {
            GenerationOutcome::clean(literal.strip_prefix('$').unwrap_or(literal).trim())
        }
        ProductField::Vendor => GenerationOutcome::clean(literal),
    }
}

fn outcome_from((value, overflow): (String, Option<String>)) -> GenerationOutcome {
    GenerationOutcome { value, overflow }
}

// =============================================================================
// Prompts
// =============================================================================

/// Build the generation prompt for a field.
///
/// Every known attribute of the draft is included. The field's own current
/// value is labelled "existing".
#[must_use]
pub fn build_prompt(field: ProductField, draft: &ProductDraft, context: Option<&str>) -> String {
    let attributes: Vec<String> = ProductField::ALL
        .iter()
        .filter_map(|&attribute| {
            let value = prompt_value(draft, attribute)?;
            let name = attribute.prompt_name();
            Some(if attribute == field {
                format!("existing {name} {value}")
            } else {
                format!("{name} {value}")
            })
        })
        .collect();

    let subject = if attributes.is_empty() {
        "for a product".to_string()
    } else {
        format!("for a product with {}", attributes.join(", "))
    };

    let mut prompt = match field {
        ProductField::Title => format!("Write a catchy product title {subject}."),
        ProductField::Description => format!(
            "Write a captivating product description (between 1500 and 5000 characters) {subject}."
        ),
        ProductField::ProductType => format!("Suggest a suitable product type {subject}."),
        ProductField::Tags => {
            format!("Suggest suitable tags {subject}. List one tag per line.")
        }
        ProductField::Price => format!("Suggest a suitable price {subject}."),
        ProductField::Vendor => format!("Suggest a suitable vendor {subject}."),
    };

    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str(&format!(" Context: {context}."));
    }
    prompt
}

/// Draft value as shown to the model. Descriptions are reduced to text.
fn prompt_value(draft: &ProductDraft, field: ProductField) -> Option<String> {
    let value = draft.known(field)?;
    if field != ProductField::Description {
        return Some(value.trim().to_string());
    }

    let text = if looks_like_html(value) {
        let paragraphs = html_to_plain_text(value);
        if paragraphs.trim().is_empty() {
            html_text_content(value)
        } else {
            paragraphs
        }
    } else {
        value.to_string()
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

// =============================================================================
// Ambiguity
// =============================================================================

fn is_ambiguous_price(reply: &str) -> bool {
    reply.contains(['-', ',', ' '])
        || reply.split_whitespace().count() > MAX_SCALAR_WORDS
}

fn is_ambiguous_vendor(reply: &str) -> bool {
    reply.contains(',') || reply.split_whitespace().count() > MAX_SCALAR_WORDS
}

fn average(low: &str, high: &str) -> Option<String> {
    let low: Decimal = low.parse().ok()?;
    let high: Decimal = high.parse().ok()?;
    Some(((low + high) / Decimal::TWO).normalize().to_string())
}
