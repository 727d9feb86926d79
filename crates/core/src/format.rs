//! Human-readable output: product reports, listings, and change tables.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::draft::{OverflowNote, ordered_notes};
use crate::normalize::html_to_plain_text;
use crate::types::{Metafield, Product};

// =============================================================================
// Product report
// =============================================================================

/// Render a product as a multi-section text report.
///
/// `collections` adds a Collections section when supplied. Notes are appended
/// after the metafield sections in their fixed order.
#[must_use]
pub fn render_product(
    product: &Product,
    metafields: &[Metafield],
    collections: Option<&[String]>,
    notes: &[OverflowNote],
) -> String {
    let price = product
        .first_price()
        .map_or_else(|| "None".to_string(), |p| p.to_string());
    let id = product
        .id
        .map_or_else(|| "None".to_string(), |id| id.to_string());
    let labels = metafields
        .iter()
        .map(Metafield::label)
        .collect::<Vec<_>>()
        .join(", ");
    let values = metafields
        .iter()
        .map(|m| m.value.as_str())
        .collect::<Vec<_>>()
        .join(",\n");

    let mut sections = vec![
        format!("Title: {}", product.title),
        format!("Description:\n{}", html_to_plain_text(&product.body_html)),
        format!("Product Type: {}", product.product_type),
        format!("Vendor: {}", product.vendor),
    ];
    if let Some(collections) = collections {
        sections.push(format!("Collections:\n{}", collections.join(", ")));
    }
    sections.extend([
        format!("Tags:\n{}", product.tags),
        format!("Price: {price}"),
        format!("Product ID: {id}"),
        format!("Product Metafields:\n{labels}"),
        format!("Metafields Values:\n{values}"),
    ]);
    sections.extend(ordered_notes(notes).iter().map(ToString::to_string));

    sections.join("\n\n")
}

// =============================================================================
// Tables
// =============================================================================

/// Render rows as a bordered, left-aligned text table.
///
/// Newlines inside cells are flattened to spaces. Rows shorter than the header
/// are padded with empty cells.
#[must_use]
pub fn render_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    let flatten = |cell: &str| cell.replace(['\r', '\n'], " ");
    let headers: Vec<String> = headers.iter().map(|h| flatten(h.as_ref())).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            (0..headers.len())
                .map(|i| row.get(i).map(|c| flatten(c)).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let border = format!("+{border}+");
    let line = |cells: &[String]| {
        let padded = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {cell:<width$} "))
            .collect::<Vec<_>>()
            .join("|");
        format!("|{padded}|")
    };

    let mut out = vec![border.clone(), line(&headers), border.clone()];
    out.extend(rows.iter().map(|row| line(row)));
    out.push(border);
    out.join("\n")
}

// =============================================================================
// Listings
// =============================================================================

/// A column of the product listing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListColumn {
    ProductId,
    Title,
    Price,
    Vendor,
    ProductType,
    Tags,
}

impl ListColumn {
    /// Columns used when none are requested.
    pub const DEFAULT: [Self; 3] = [Self::ProductId, Self::Title, Self::Price];

    /// Column heading.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::ProductId => "Product ID",
            Self::Title => "Title",
            Self::Price => "Price",
            Self::Vendor => "Vendor",
            Self::ProductType => "Product Type",
            Self::Tags => "Tags",
        }
    }

    fn cell(self, product: &Product) -> String {
        match self {
            Self::ProductId => product
                .id
                .map_or_else(|| "N/A".to_string(), |id| id.to_string()),
            Self::Title => product.title.clone(),
            Self::Price => product
                .first_price()
                .map_or_else(|| "N/A".to_string(), |p| p.to_string()),
            Self::Vendor => product.vendor.clone(),
            Self::ProductType => product.product_type.clone(),
            Self::Tags => product.tags.clone(),
        }
    }
}

/// Column name that is not part of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown column \"{0}\"")]
pub struct UnknownColumn(pub String);

impl FromStr for ListColumn {
    type Err = UnknownColumn;

    /// Case-insensitive; spaces and underscores are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(' ', "_").as_str() {
            "product_id" | "id" => Ok(Self::ProductId),
            "title" => Ok(Self::Title),
            "price" => Ok(Self::Price),
            "vendor" => Ok(Self::Vendor),
            "product_type" | "type" => Ok(Self::ProductType),
            "tags" => Ok(Self::Tags),
            _ => Err(UnknownColumn(s.to_string())),
        }
    }
}

/// Parse requested column names, skipping unknown ones.
///
/// Falls back to [`ListColumn::DEFAULT`] when nothing usable was requested.
#[must_use]
pub fn parse_columns<S: AsRef<str>>(names: &[S]) -> Vec<ListColumn> {
    let columns: Vec<ListColumn> = names
        .iter()
        .filter_map(|name| match name.as_ref().parse() {
            Ok(column) => Some(column),
            Err(e) => {
                debug!(error = %e, "Skipping listing column");
                None
            }
        })
        .collect();

    if columns.is_empty() {
        ListColumn::DEFAULT.to_vec()
    } else {
        columns
    }
}

/// Order applied to product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Store order (ascending product ID).
    #[default]
    Default,
    AlphaAsc,
    AlphaDesc,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    /// Accepted names, for help text and error messages.
    pub const NAMES: [&str; 5] = ["default", "alpha-asc", "alpha-desc", "price-asc", "price-desc"];

    /// Sort products in place. Ties keep their store order.
    pub fn sort(self, products: &mut [Product]) {
        let by_title = |a: &Product, b: &Product| a.title.to_lowercase().cmp(&b.title.to_lowercase());
        let by_price = |a: &Product, b: &Product| price_key(a).cmp(&price_key(b));
        match self {
            Self::Default => {}
            Self::AlphaAsc => products.sort_by(by_title),
            Self::AlphaDesc => products.sort_by(|a, b| by_title(b, a)),
            Self::PriceAsc => products.sort_by(by_price),
            Self::PriceDesc => products.sort_by(|a, b| by_price(b, a)),
        }
    }
}

// Products without a price sort as zero.
fn price_key(product: &Product) -> Decimal {
    product
        .first_price()
        .map_or(Decimal::ZERO, |price| price.amount())
}

/// Sort order name that is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order \"{0}\" (expected one of: default, alpha-asc, alpha-desc, price-asc, price-desc)")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "default" => Ok(Self::Default),
            "alpha-asc" => Ok(Self::AlphaAsc),
            "alpha-desc" => Ok(Self::AlphaDesc),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            _ => Err(UnknownSortOrder(s.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::AlphaAsc => "alpha-asc",
            Self::AlphaDesc => "alpha-desc",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
        };
        f.write_str(name)
    }
}

/// Render `Found N products:` followed by a table of the given columns.
///
/// Products are rendered in the order given; sort them first.
#[must_use]
pub fn render_listing(products: &[Product], columns: &[ListColumn]) -> String {
    let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
    let rows: Vec<Vec<String>> = products
        .iter()
        .map(|product| columns.iter().map(|c| c.cell(product)).collect())
        .collect();
    format!(
        "Found {} products:\n{}",
        products.len(),
        render_table(&headers, &rows)
    )
}
