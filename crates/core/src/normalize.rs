//! Text clean-up for generated and user-supplied field values.
//!
//! Everything here is a pure function over `&str`. Length budgets are counted
//! in characters, not bytes.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum length of a product type.
pub const MAX_PRODUCT_TYPE_LEN: usize = 255;
/// Maximum length of the joined tag list.
pub const MAX_TAGS_LEN: usize = 255;

/// Words kept lowercase inside titles.
pub const SMALL_WORDS: [&str; 19] = [
    "a", "an", "and", "as", "at", "but", "by", "for", "if", "in", "nor", "of", "on", "or", "so",
    "the", "to", "up", "yet",
];

// =============================================================================
// Titles
// =============================================================================

/// Capitalize each word and lowercase small words that are neither first nor
/// last.
///
/// Words are rejoined with single spaces.
#[must_use]
pub fn normalize_title(text: &str) -> String {
    let cased = title_case(text);
    let words: Vec<&str> = cased.split_whitespace().collect();
    let last = words.len().saturating_sub(1);

    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && i < last && SMALL_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                (*word).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the first letter of every alphabetic run and lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

// =============================================================================
// Descriptions
// =============================================================================

static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p>").expect("Invalid regex"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

/// Wrap every non-blank line in `<p>` tags.
///
/// Blank lines never become empty paragraphs. Returns an empty string when the
/// text has no content.
#[must_use]
pub fn paragraphs_to_html(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{line}</p>"))
        .collect()
}

/// Whether the text already looks like markup.
#[must_use]
pub fn looks_like_html(text: &str) -> bool {
    text.contains('<')
}

/// Plain text of every `<p>` element, one paragraph per line.
///
/// Markup outside paragraphs is ignored.
#[must_use]
pub fn html_to_plain_text(html: &str) -> String {
    PARAGRAPH_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|inner| decode_entities(&TAG_RE.replace_all(inner.as_str(), "")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// All text content of an HTML fragment, tags removed and trimmed.
#[must_use]
pub fn html_text_content(html: &str) -> String {
    decode_entities(&TAG_RE.replace_all(html, ""))
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

// =============================================================================
// Product type and tags
// =============================================================================

static TAG_DECORATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s|\.$").expect("Invalid regex"));

/// Cut a product type down to `max_length` characters.
///
/// Returns the kept text and, when something was cut, the full original.
#[must_use]
pub fn trim_product_type(text: &str, max_length: usize) -> (String, Option<String>) {
    if text.chars().count() > max_length {
        let kept: String = text.chars().take(max_length).collect();
        (kept, Some(text.to_string()))
    } else {
        (text.to_string(), None)
    }
}

/// Split newline-separated tags, dropping list numbering (`1. `) and a
/// trailing period.
///
/// Blank entries are skipped.
#[must_use]
pub fn split_tag_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| TAG_DECORATION_RE.replace_all(line.trim(), "").trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Keep as many whole tags as fit into `max_length` once joined with `", "`.
///
/// Tags that do not fit are returned comma-joined as overflow. A tag is never
/// partially kept; a later, shorter tag may still fit after a longer one was
/// dropped.
#[must_use]
pub fn trim_tags(text: &str, max_length: usize) -> (String, Option<String>) {
    let mut kept: Vec<String> = Vec::new();
    let mut overflow: Vec<String> = Vec::new();
    let mut length = 0usize;

    for tag in split_tag_list(text) {
        let separator = if kept.is_empty() { 0 } else { 2 };
        let new_length = length + separator + tag.chars().count();
        if new_length > max_length {
            overflow.push(tag);
        } else {
            kept.push(tag);
            length = new_length;
        }
    }

    let overflow = (!overflow.is_empty()).then(|| overflow.join(", "));
    (kept.join(", "), overflow)
}
