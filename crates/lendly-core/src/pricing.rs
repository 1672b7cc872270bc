//! # Pricing Module
//!
//! Tier selection and subtotal math for rentals.
//!
//! ## Two Different Questions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  "I picked dates, what is the cheapest way to pay?"                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  optimal_rental_type(days, tiers) ──► OptimalRentalInfo                 │
//! │       tries daily, then weekly, then monthly; keeps the strict minimum  │
//! │                                                                         │
//! │  "I picked 2 weeks, what do I owe?"                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subtotal_by_quantity(Weekly, 2, tiers) ──► 2 × per_week                │
//! │       exact tier multiplication, never derived from a day count         │
//! │                                                                         │
//! │  Both are ESTIMATES. The backend computes the amount actually charged. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PriceTiers, RentalType};
use crate::{DAYS_PER_MONTH, DAYS_PER_WEEK};

// =============================================================================
// Optimal Rental Type
// =============================================================================

/// How a tier total is composed, for "2 months + 1 week + 3 days" labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierBreakdown {
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
}

impl TierBreakdown {
    fn cost(&self, tiers: &PriceTiers) -> Money {
        let mut total = tiers.per_day.times(self.days);
        if let Some(per_week) = tiers.per_week {
            total += per_week.times(self.weeks);
        }
        if let Some(per_month) = tiers.per_month {
            total += per_month.times(self.months);
        }
        total
    }
}

/// The cheapest tier for a rental length, with what it saves over daily billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OptimalRentalInfo {
    pub rental_type: RentalType,
    /// Unit price of the chosen tier.
    pub rate: Money,
    /// `baseline - total`, never negative.
    pub savings: Money,
    /// Cost under the chosen tier.
    pub total: Money,
    /// Cost at the daily rate.
    pub baseline: Money,
    pub breakdown: TierBreakdown,
}

impl OptimalRentalInfo {
    /// Savings as basis points of the daily baseline (1429 = 14.29%).
    pub fn savings_bps(&self) -> u32 {
        self.savings.basis_points_of(self.baseline)
    }

    /// Whether a tier other than daily won.
    pub fn has_discount(&self) -> bool {
        self.savings > Money::zero()
    }
}

/// Picks the cheapest pricing tier for `rental_days`.
///
/// ## Algorithm
/// ```text
/// days <= 0 ──────────────► Daily, rate = per_day, savings = 0
///
/// best = per_day × days                                   (baseline)
/// days >= 7  && per_week:   weeks × per_week + rest × per_day
///                           ──► Weekly if strictly cheaper
/// days >= 30 && per_month:  months × per_month + remainder
///                           remainder >= 7 && per_week → weeks + days
///                           otherwise                  → days at per_day
///                           ──► Monthly if strictly cheaper than best so far
/// ```
/// Ties keep the earlier tier: weekly beats monthly at equal cost.
///
/// ## Example
/// ```rust
/// use lendly_core::money::Money;
/// use lendly_core::pricing::optimal_rental_type;
/// use lendly_core::types::{PriceTiers, RentalType};
///
/// let tiers = PriceTiers::daily(Money::from_major(100))
///     .with_week(Money::from_major(600))
///     .with_month(Money::from_major(2500));
///
/// let info = optimal_rental_type(14, &tiers);
/// assert_eq!(info.rental_type, RentalType::Weekly);
/// assert_eq!(info.savings, Money::from_major(200));
/// ```
pub fn optimal_rental_type(rental_days: i64, tiers: &PriceTiers) -> OptimalRentalInfo {
    if rental_days <= 0 {
        return OptimalRentalInfo {
            rental_type: RentalType::Daily,
            rate: tiers.per_day,
            savings: Money::zero(),
            total: Money::zero(),
            baseline: Money::zero(),
            breakdown: TierBreakdown::default(),
        };
    }

    let baseline = tiers.per_day.times(rental_days);
    let mut best = OptimalRentalInfo {
        rental_type: RentalType::Daily,
        rate: tiers.per_day,
        savings: Money::zero(),
        total: baseline,
        baseline,
        breakdown: TierBreakdown {
            days: rental_days,
            ..TierBreakdown::default()
        },
    };

    if let Some(per_week) = tiers.per_week {
        if rental_days >= DAYS_PER_WEEK {
            let breakdown = TierBreakdown {
                months: 0,
                weeks: rental_days / DAYS_PER_WEEK,
                days: rental_days % DAYS_PER_WEEK,
            };
            let total = breakdown.cost(tiers);
            if total < best.total {
                best = OptimalRentalInfo {
                    rental_type: RentalType::Weekly,
                    rate: per_week,
                    total,
                    breakdown,
                    ..best
                };
            }
        }
    }

    if let Some(per_month) = tiers.per_month {
        if rental_days >= DAYS_PER_MONTH {
            let remainder = rental_days % DAYS_PER_MONTH;
            let (weeks, days) = if remainder >= DAYS_PER_WEEK && tiers.per_week.is_some() {
                (remainder / DAYS_PER_WEEK, remainder % DAYS_PER_WEEK)
            } else {
                (0, remainder)
            };
            let breakdown = TierBreakdown {
                months: rental_days / DAYS_PER_MONTH,
                weeks,
                days,
            };
            let total = breakdown.cost(tiers);
            if total < best.total {
                best = OptimalRentalInfo {
                    rental_type: RentalType::Monthly,
                    rate: per_month,
                    total,
                    breakdown,
                    ..best
                };
            }
        }
    }

    best.savings = baseline - best.total;
    best
}

// =============================================================================
// Subtotals
// =============================================================================

/// What the user asked to be billed for.
///
/// Keeping the two shapes apart stops a quantity-based booking from being
/// re-priced through a day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RentalSelection {
    /// A number of days, billed at the daily rate.
    Days { days: i64 },
    /// An explicit number of tier units ("2 weeks").
    Quantity { rental_type: RentalType, quantity: i64 },
}

impl RentalSelection {
    /// Number of calendar days the selection covers.
    pub fn covered_days(&self) -> i64 {
        match self {
            RentalSelection::Days { days } => (*days).max(0),
            RentalSelection::Quantity {
                rental_type,
                quantity,
            } => (*quantity).max(0).saturating_mul(rental_type.days_per_unit()),
        }
    }
}

/// Daily-tier subtotal: `per_day × days`, zero for non-positive day counts.
pub fn subtotal_by_days(per_day: Money, days: i64) -> Money {
    if days <= 0 {
        return Money::zero();
    }
    per_day.times(days)
}

/// Subtotal for an explicitly chosen number of tier units.
///
/// Uses the tier rate when the product offers it, otherwise falls back to
/// `7 × per_day` per week or `30 × per_day` per month.
///
/// ```rust
/// use lendly_core::money::Money;
/// use lendly_core::pricing::subtotal_by_quantity;
/// use lendly_core::types::{PriceTiers, RentalType};
///
/// let tiers = PriceTiers::daily(Money::from_major(100)).with_week(Money::from_major(600));
/// assert_eq!(
///     subtotal_by_quantity(RentalType::Weekly, 2, &tiers),
///     Money::from_major(1200)
/// );
/// assert_eq!(
///     subtotal_by_quantity(RentalType::Monthly, 1, &tiers),
///     Money::from_major(3000)
/// );
/// ```
pub fn subtotal_by_quantity(rental_type: RentalType, quantity: i64, tiers: &PriceTiers) -> Money {
    if quantity <= 0 {
        return Money::zero();
    }
    let unit = tiers
        .rate_for(rental_type)
        .unwrap_or_else(|| tiers.per_day.times(rental_type.days_per_unit()));
    unit.times(quantity)
}

/// Subtotal for a [`RentalSelection`].
pub fn subtotal(selection: RentalSelection, tiers: &PriceTiers) -> Money {
    match selection {
        RentalSelection::Days { days } => subtotal_by_days(tiers.per_day, days),
        RentalSelection::Quantity {
            rental_type,
            quantity,
        } => subtotal_by_quantity(rental_type, quantity, tiers),
    }
}

/// Tier units the backend bills for a day count: `ceil(days / unit)`.
///
/// The backend rounds a 10-day weekly rental up to 2 weeks. The client uses
/// this only to explain a difference between its estimate and the backend total.
pub fn backend_quantity(rental_type: RentalType, days: i64) -> i64 {
    if days <= 0 {
        return 0;
    }
    let unit = rental_type.days_per_unit();
    days / unit + i64::from(days % unit != 0)
}

// =============================================================================
// Unit Tests
// =============================================================================
