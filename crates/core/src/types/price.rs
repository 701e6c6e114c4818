//! Type-safe price representation using decimal arithmetic.
//!
//! The store sells in Bangladeshi taka only. The remote API exchanges prices
//! as JSON numbers (occasionally as numeric strings from older records), so
//! [`Price`] serializes to a number and accepts either form when reading.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// Prices cannot be negative.
    #[error("price cannot be negative")]
    Negative,
}

/// An amount in Bangladeshi taka.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of taka.
    #[must_use]
    pub fn from_taka(taka: i64) -> Self {
        Self(Decimal::from(taka))
    }

    /// Parse a user-entered price (admin product form).
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] when the input is not a number or is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let s = s.trim();
        let amount = Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| PriceError::Invalid(s.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The line total for `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Storefront display: `৳2500`, `৳12.5`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("৳{}", self.0.normalize())
    }

    /// Invoice display, always two decimals: `Tk 2500.00`.
    #[must_use]
    pub fn invoice(&self) -> String {
        format!("Tk {:.2}", self.0.round_dp(2))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let normalized = self.0.normalize();
        if normalized.scale() == 0
            && let Some(whole) = normalized.to_i64()
        {
            return serializer.serialize_i64(whole);
        }
        serializer.serialize_f64(normalized.to_f64().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        Decimal::from_str(text.trim())
            .or_else(|_| Decimal::from_scientific(text.trim()))
            .map(Self)
            .map_err(|_| serde::de::Error::custom(format!("invalid price: {text}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        assert_eq!(Price::from_taka(2500).display(), "৳2500");
        assert_eq!(Price::parse("12.50").unwrap().display(), "৳12.5");
        assert_eq!(Price::from_taka(2500).invoice(), "Tk 2500.00");
        assert_eq!(Price::parse("99.999").unwrap().invoice(), "Tk 100.00");
    }

    #[test]
    fn test_times_and_sum() {
        let lines = [Price::from_taka(2500).times(2), Price::from_taka(300).times(1)];
        let total: Price = lines.into_iter().sum();
        assert_eq!(total, Price::from_taka(5300));
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let a: Price = serde_json::from_str("4500").unwrap();
        let b: Price = serde_json::from_str("\"4500\"").unwrap();
        let c: Price = serde_json::from_str("12.75").unwrap();
        assert_eq!(a, b);
        assert_eq!(c.invoice(), "Tk 12.75");
        assert!(serde_json::from_str::<Price>("\"abc\"").is_err());
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&Price::from_taka(3200)).unwrap(), "3200");
        assert_eq!(
            serde_json::to_string(&Price::parse("12.5").unwrap()).unwrap(),
            "12.5"
        );
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
        assert!(matches!(Price::parse("ten"), Err(PriceError::Invalid(_))));
    }
}
