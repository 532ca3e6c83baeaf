//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog records carry the unit price as a JSON number, and the cart
//! mirror writes it back as a number. It is held as a [`Decimal`] so that
//! arithmetic and comparisons never see float drift.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A unit price in the store's currency.
///
/// Serialized as a JSON number: whole amounts as integers, the rest as the
/// shortest float that parses back to the same decimal. Deserializes from a
/// JSON number or a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_string()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let whole = if self.0.fract().is_zero() { self.0.to_i64() } else { None };
        if let Some(units) = whole {
            return serializer.serialize_i64(units);
        }
        match self.0.to_f64() {
            Some(amount) => serializer.serialize_f64(amount),
            None => Err(serde::ser::Error::custom(format!("price {} is not representable", self.0))),
        }
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_display_two_places() {
        assert_eq!(Price::from_units(100).to_string(), "$100.00");
        assert_eq!(Price::from_cents(17990).to_string(), "$179.90");
    }

    #[test]
    fn test_price_parse() {
        assert_eq!("179.9".parse::<Price>().unwrap(), Price::from_cents(17990));
        assert_eq!("abc".parse::<Price>(), Err(PriceError::Invalid("abc".to_string())));
        assert_eq!("-1".parse::<Price>(), Err(PriceError::Negative));
    }

    #[test]
    fn test_price_accepts_json_number() {
        let price: Price = serde_json::from_str("179.9").unwrap();
        assert_eq!(price, Price::from_cents(17990));
    }

    #[test]
    fn test_price_serializes_as_json_number() {
        assert_eq!(serde_json::to_string(&Price::from_units(100)).unwrap(), "100");
        assert_eq!(serde_json::to_string(&Price::from_cents(17990)).unwrap(), "179.9");
        assert_eq!(serde_json::to_value(Price::from_cents(17990)).unwrap(), serde_json::json!(179.9));
    }

    #[test]
    fn test_price_accepts_decimal_string() {
        let price: Price = serde_json::from_str("\"139.90\"").unwrap();
        assert_eq!(price, Price::from_cents(13990));
    }

    #[test]
    fn test_price_json_round_trip_is_exact() {
        let price = Price::from_cents(13990);
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(serde_json::from_str::<Price>(&json).unwrap(), price);
    }
}
