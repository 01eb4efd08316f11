//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A unit price in the restaurant's display currency.
///
/// Stored as a decimal amount in the currency's standard unit (e.g. dollars,
/// not cents) to avoid float rounding in cart subtotals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the decimal amount.
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

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let price = Price::from_cents(1099);
        assert_eq!(format!("{price}"), "$10.99");
    }

    #[test]
    fn test_line_total() {
        let price = Price::from_cents(250) * 3;
        assert_eq!(price, Price::from_cents(750));
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_cents(100), Price::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(350));
    }

    #[test]
    fn test_serde_uses_string() {
        // serde-with-str keeps decimal precision over the wire
        let price = Price::from_cents(1050);
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"10.50\"");

        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }
}
