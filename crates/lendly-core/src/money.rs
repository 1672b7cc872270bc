//! # Money Module
//!
//! Provides the `Money` type used for every rental price in Lendly.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RENTAL PRICES ARE SUMS OF PRODUCTS                                     │
//! │                                                                         │
//! │  2 months × 2500.00 + 1 week × 600.00 + 3 days × 100.00                 │
//! │                                                                         │
//! │  With floats every term can drift by a fraction of a cent and the      │
//! │  "you save" figure stops matching the difference of the two totals.    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Backend sends 2500.00 → stored as 250000 cents                      │
//! │    All tier math is exact integer multiplication and addition          │
//! │    Overflow saturates at ±i64::MAX cents instead of wrapping           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lendly_core::money::Money;
//!
//! let per_week = Money::from_major(600);
//! let two_weeks = per_week * 2;
//! assert_eq!(two_weeks, Money::from_major(1200));
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  RentalProduct.rental_price_per_* ──► PriceTiers                        │
/// │                                          │                              │
/// │                  ┌───────────────────────┼──────────────────────┐       │
/// │                  ▼                       ▼                      ▼       │
/// │         optimal_rental_type      subtotal_by_quantity     Quote.estimate│
/// │         (rate, savings)          (user-picked tier)       (vs backend)  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use lendly_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ```rust
    /// use lendly_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(25).cents(), 2500);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major.saturating_mul(100))
    }

    /// Converts a decimal amount (as the rental API sends it) to cents,
    /// rounding to the nearest cent.
    ///
    /// Returns `None` for NaN and infinities.
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        Some(Money((amount * 100.0).round() as i64))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the fractional portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Largest representable amount.
    pub const MAX: Money = Money(i64::MAX);

    /// Multiplies a unit price by a count of units (days, weeks, months).
    ///
    /// Saturates instead of overflowing, so an absurd day count yields
    /// [`Money::MAX`] rather than a wrapped negative price.
    ///
    /// ```rust
    /// use lendly_core::money::Money;
    ///
    /// let per_day = Money::from_major(100);
    /// assert_eq!(per_day.times(3), Money::from_major(300));
    /// assert_eq!(per_day.times(i64::MAX), Money::MAX);
    /// ```
    #[inline]
    pub const fn times(&self, units: i64) -> Self {
        Money(self.0.saturating_mul(units))
    }

    /// Expresses `self` as basis points of `whole` (1000 = 10%).
    ///
    /// Rounds half away from zero; returns 0 when `whole` is not positive.
    pub fn basis_points_of(&self, whole: Money) -> u32 {
        if whole.0 <= 0 || self.0 <= 0 {
            return 0;
        }
        let bps = (self.0 as i128 * 10_000 + whole.0 as i128 / 2) / whole.0 as i128;
        bps.clamp(0, u32::MAX as i128) as u32
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering. The display layer formats currency itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, units: i64) -> Self {
        self.times(units)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Decimal Wire Format
// =============================================================================

/// Serde helpers for API fields that carry decimal amounts.
///
/// The rental API sends prices either as JSON numbers (`100`, `99.5`) or as
/// decimal strings (`"2500.00"`). Both are accepted and converted to cents.
///
/// ```rust
/// use lendly_core::money::{self, Money};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Row {
///     #[serde(deserialize_with = "money::decimal::deserialize")]
///     price: Money,
/// }
///
/// let row: Row = serde_json::from_str(r#"{"price": "12.50"}"#).unwrap();
/// assert_eq!(row.price.cents(), 1250);
/// ```
pub mod decimal {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    fn convert<E: serde::de::Error>(raw: RawAmount) -> Result<Money, E> {
        let value = match raw {
            RawAmount::Number(n) => n,
            RawAmount::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid decimal amount: {s:?}")))?,
        };
        Money::from_decimal(value).ok_or_else(|| E::custom("amount is not a finite number"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        convert(RawAmount::deserialize(deserializer)?)
    }

    /// Same as [`deserialize`] for optional tiers; `null` and a missing field map to `None`.
    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawAmount>::deserialize(deserializer)? {
            Some(raw) => convert(raw).map(Some),
            None => Ok(None),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Money::from_major(100).cents(), 10_000);
        assert_eq!(Money::from_cents(1099).major(), 10);
        assert_eq!(Money::from_cents(1099).minor(), 99);
    }

    #[test]
    fn test_from_decimal_rounds_to_cent() {
        assert_eq!(Money::from_decimal(19.999).map(|m| m.cents()), Some(2000));
        assert_eq!(Money::from_decimal(12.5).map(|m| m.cents()), Some(1250));
        assert_eq!(Money::from_decimal(f64::NAN), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(250_000).to_string(), "2500.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let month = Money::from_major(2500);
        let week = Money::from_major(600);
        let day = Money::from_major(100);

        let total: Money = [month * 2, week, day.times(3)].into_iter().sum();
        assert_eq!(total, Money::from_major(5900));
        assert_eq!(Money::from_major(7000) - total, Money::from_major(1100));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let per_month = Money::from_major(2500);
        assert_eq!(per_month.times(10_000_000_000_000_000), Money::MAX);
        assert_eq!(per_month * i64::MIN, Money::from_cents(i64::MIN));
        assert_eq!(Money::MAX + Money::from_cents(1), Money::MAX);

        let mut total = Money::MAX;
        total += per_month;
        assert_eq!(total, Money::MAX);

        assert_eq!(Money::from_cents(i64::MIN) - per_month, Money::from_cents(i64::MIN));
        assert_eq!(Money::from_major(i64::MAX), Money::MAX);
    }

    #[test]
    fn test_basis_points_of() {
        let savings = Money::from_major(200);
        let baseline = Money::from_major(1400);
        // 200 / 1400 = 14.2857% → 1429 bps
        assert_eq!(savings.basis_points_of(baseline), 1429);
        assert_eq!(savings.basis_points_of(Money::zero()), 0);
        assert_eq!(Money::zero().basis_points_of(baseline), 0);
    }

    #[test]
    fn test_decimal_wire_format() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(deserialize_with = "decimal::deserialize")]
            price: Money,
            #[serde(default, deserialize_with = "decimal::deserialize_option")]
            weekly: Option<Money>,
        }

        let row: Row = serde_json::from_str(r#"{"price": 100, "weekly": "600.00"}"#).unwrap();
        assert_eq!(row.price, Money::from_major(100));
        assert_eq!(row.weekly, Some(Money::from_major(600)));

        let row: Row = serde_json::from_str(r#"{"price": "19.99", "weekly": null}"#).unwrap();
        assert_eq!(row.price.cents(), 1999);
        assert_eq!(row.weekly, None);

        let row: Row = serde_json::from_str(r#"{"price": 5}"#).unwrap();
        assert_eq!(row.weekly, None);

        assert!(serde_json::from_str::<Row>(r#"{"price": "abc"}"#).is_err());
    }
}
