//! Type-safe price representation using decimal arithmetic.
//!
//! Shopify REST sends variant prices as strings (`"19.99"`), so `Price`
//! serializes through `rust_decimal`'s string representation.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when turning text into a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The text is not a decimal number.
    #[error("\"{0}\" is not a number")]
    NotNumeric(String),
    /// The amount is below zero.
    #[error("{0} is negative")]
    Negative(Decimal),
}

/// A non-negative price in the shop's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Parse a price from loosely formatted text.
    ///
    /// Surrounding whitespace and a single leading `$` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotNumeric`] if the remaining text is not a
    /// decimal number and [`PriceError::Negative`] for amounts below zero.
    pub fn parse(text: &str) -> Result<Self, PriceError> {
        let amount = parse_amount(text)?;
        Self::new(amount)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

/// Parse decimal text, ignoring whitespace and a leading `$`.
///
/// Unlike [`Price::parse`] this accepts negative amounts, so callers can tell
/// "not a number" apart from "below zero".
///
/// # Errors
///
/// Returns [`PriceError::NotNumeric`] if the text is not a decimal number.
pub fn parse_amount(text: &str) -> Result<Decimal, PriceError> {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    Decimal::from_str(unsigned)
        .or_else(|_| Decimal::from_scientific(unsigned))
        .map_err(|_| PriceError::NotNumeric(text.to_string()))
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_dollar() {
        assert_eq!(Price::parse("19.99").unwrap().amount(), Decimal::new(1999, 2));
        assert_eq!(Price::parse("$19.99").unwrap().amount(), Decimal::new(1999, 2));
        assert_eq!(Price::parse("  $ 5 ").unwrap().amount(), Decimal::new(5, 0));
    }

    #[test]
    fn test_parse_rejects_words() {
        assert!(matches!(
            Price::parse("about ten dollars"),
            Err(PriceError::NotNumeric(_))
        ));
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert!(matches!(Price::parse("-5"), Err(PriceError::Negative(_))));
        assert!(Price::parse("0").is_ok());
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::parse("15").unwrap().to_string(), "15.00");
        assert_eq!(Price::parse("19.9").unwrap().to_string(), "19.90");
    }

    #[test]
    fn test_serde_as_string() {
        let price = Price::parse("24.50").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"24.50\"");
        let back: Price = serde_json::from_str("\"24.50\"").unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_deserialize_negative_fails() {
        assert!(serde_json::from_str::<Price>("\"-1.00\"").is_err());
    }
}
