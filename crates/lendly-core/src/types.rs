//! # Domain Types
//!
//! Core domain types used throughout Lendly.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ RentalProduct   │   │   PriceTiers    │   │   RentalType    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  per_day        │   │  Daily          │       │
//! │  │  price per tier │   │  per_week?      │   │  Weekly         │       │
//! │  │  min/max days   │   │  per_month?     │   │  Monthly        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │ BufferSettings  │   │  RentalPeriod   │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  enabled        │   │  start (date)   │                              │
//! │  │  delivery days  │   │  end (date)     │                              │
//! │  │  return days    │   │                 │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::calendar::api_date;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{self, Money};
use crate::{DAYS_PER_MONTH, DAYS_PER_WEEK};

// =============================================================================
// Rental Type
// =============================================================================

/// The pricing tier a rental is billed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RentalType {
    /// Billed per day.
    #[default]
    Daily,
    /// Billed per full week of 7 days.
    Weekly,
    /// Billed per full month of 30 days.
    Monthly,
}

impl RentalType {
    /// Number of days one unit of this tier covers.
    pub const fn days_per_unit(&self) -> i64 {
        match self {
            RentalType::Daily => 1,
            RentalType::Weekly => DAYS_PER_WEEK,
            RentalType::Monthly => DAYS_PER_MONTH,
        }
    }
}

impl fmt::Display for RentalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RentalType::Daily => write!(f, "daily"),
            RentalType::Weekly => write!(f, "weekly"),
            RentalType::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for RentalType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "days" => Ok(RentalType::Daily),
            "weekly" | "week" | "weeks" => Ok(RentalType::Weekly),
            "monthly" | "month" | "months" => Ok(RentalType::Monthly),
            other => Err(ValidationError::InvalidFormat {
                field: "rental type".to_string(),
                reason: format!("unknown tier '{other}', expected daily, weekly or monthly"),
            }),
        }
    }
}

// =============================================================================
// Price Tiers
// =============================================================================

/// The three rental rates a product may offer.
///
/// Only the daily rate is mandatory; weekly and monthly are optional
/// discounts the owner can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceTiers {
    pub per_day: Money,
    pub per_week: Option<Money>,
    pub per_month: Option<Money>,
}

impl PriceTiers {
    /// Tiers with only a daily rate.
    pub const fn daily(per_day: Money) -> Self {
        PriceTiers {
            per_day,
            per_week: None,
            per_month: None,
        }
    }

    pub fn with_week(mut self, per_week: Money) -> Self {
        self.per_week = Some(per_week);
        self
    }

    pub fn with_month(mut self, per_month: Money) -> Self {
        self.per_month = Some(per_month);
        self
    }

    /// Rate of the given tier, if the product offers it.
    pub fn rate_for(&self, rental_type: RentalType) -> Option<Money> {
        match rental_type {
            RentalType::Daily => Some(self.per_day),
            RentalType::Weekly => self.per_week,
            RentalType::Monthly => self.per_month,
        }
    }

    /// Rejects negative rates.
    pub fn validate(&self) -> CoreResult<()> {
        let tiers = [
            (RentalType::Daily, Some(self.per_day)),
            (RentalType::Weekly, self.per_week),
            (RentalType::Monthly, self.per_month),
        ];
        for (tier, rate) in tiers {
            if rate.is_some_and(|r| r.is_negative()) {
                return Err(CoreError::InvalidPrice {
                    tier: tier.to_string(),
                    reason: "must not be negative".to_string(),
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Buffer Settings
// =============================================================================

/// Days blocked around every existing rental for delivery and pickup.
///
/// Delivered by the public settings endpoint; the same values apply to every
/// product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BufferSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Days before a rental starts that are reserved for delivery.
    #[serde(default)]
    pub delivery_buffer_days: u32,
    /// Days after a rental ends that are reserved for return.
    #[serde(default)]
    pub return_buffer_days: u32,
}

impl BufferSettings {
    /// Buffers switched off.
    pub const fn disabled() -> Self {
        BufferSettings {
            enabled: false,
            delivery_buffer_days: 0,
            return_buffer_days: 0,
        }
    }

    /// Buffers switched on with the given lengths.
    pub const fn new(delivery_buffer_days: u32, return_buffer_days: u32) -> Self {
        BufferSettings {
            enabled: true,
            delivery_buffer_days,
            return_buffer_days,
        }
    }

    /// Delivery buffer length when enabled, else 0.
    pub fn effective_delivery_days(&self) -> u32 {
        if self.enabled {
            self.delivery_buffer_days
        } else {
            0
        }
    }

    /// Return buffer length when enabled, else 0.
    pub fn effective_return_days(&self) -> u32 {
        if self.enabled {
            self.return_buffer_days
        } else {
            0
        }
    }
}

// =============================================================================
// Rental Period
// =============================================================================

/// An existing booking on a product, both days inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RentalPeriod {
    #[serde(rename = "start_date", alias = "start", with = "api_date")]
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[serde(rename = "end_date", alias = "end", with = "api_date")]
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl RentalPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        RentalPeriod { start, end }
    }
}

// =============================================================================
// Rental Product
// =============================================================================

/// The slice of a product listing that pricing and availability need.
///
/// Field names follow the rental API's product payload; prices arrive as
/// decimal numbers or strings and are stored as [`Money`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RentalProduct {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(deserialize_with = "money::decimal::deserialize")]
    pub rental_price_per_day: Money,

    #[serde(default, deserialize_with = "money::decimal::deserialize_option")]
    pub rental_price_per_week: Option<Money>,

    #[serde(default, deserialize_with = "money::decimal::deserialize_option")]
    pub rental_price_per_month: Option<Money>,

    #[serde(default)]
    pub min_rental_duration_days: Option<i64>,

    #[serde(default)]
    pub max_rental_duration_days: Option<i64>,
}

impl RentalProduct {
    /// The product's rate card.
    pub fn price_tiers(&self) -> PriceTiers {
        PriceTiers {
            per_day: self.rental_price_per_day,
            per_week: self.rental_price_per_week,
            per_month: self.rental_price_per_month,
        }
    }

    /// Minimum rental length, defaulting to one day.
    pub fn min_days(&self) -> i64 {
        self.min_rental_duration_days
            .filter(|d| *d > 0)
            .unwrap_or(crate::DEFAULT_MIN_RENTAL_DAYS)
    }

    /// Maximum rental length, if the owner set one.
    pub fn max_days(&self) -> Option<i64> {
        self.max_rental_duration_days.filter(|d| *d > 0)
    }
}

/// Accepts ids sent either as JSON strings or as integers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
