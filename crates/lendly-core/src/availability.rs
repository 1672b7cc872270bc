//! # Availability Module
//!
//! Turns booked dates and existing rentals into a per-day availability map.
//!
//! ## Merge Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each day d in [start, end]:                                        │
//! │                                                                         │
//! │  month of d failed to load? ──► unavailable (Unverified)                │
//! │           │ no                                                          │
//! │           ▼                                                             │
//! │  d in booked dates? ──────────► unavailable (Booked)                    │
//! │           │ no                                                          │
//! │           ▼                                                             │
//! │  buffers enabled, and for some rental:                                  │
//! │    start - delivery <= d < start ──► unavailable (DeliveryBuffer)       │
//! │    end < d <= end + return ────────► unavailable (ReturnBuffer)         │
//! │           │ no                                                          │
//! │           ▼                                                             │
//! │  available                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timeline for a rental on the 10th-12th with 2 delivery and 1 return day:
//! ```text
//!   7   8   9   10  11  12  13  14
//!   ✓   ✗   ✗   ■   ■   ■   ✗   ✓      ■ booked   ✗ buffer
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use ts_rs::TS;

use crate::calendar::{DateRange, YearMonth};
use crate::types::{BufferSettings, RentalPeriod};

// =============================================================================
// Date Availability Map
// =============================================================================

/// Availability per calendar day, serialized as `{"YYYY-MM-DD": bool}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct DateAvailabilityMap(
    #[ts(as = "std::collections::HashMap<String, bool>")] BTreeMap<NaiveDate, bool>,
);

impl DateAvailabilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, available: bool) {
        self.0.insert(date, available);
    }

    /// Availability of `date`, `None` if it was never checked.
    pub fn get(&self, date: NaiveDate) -> Option<bool> {
        self.0.get(&date).copied()
    }

    /// Whether `date` is known to be free. Unknown dates count as taken.
    pub fn is_available(&self, date: NaiveDate) -> bool {
        self.get(date).unwrap_or(false)
    }

    /// Overwrites entries with those from `newer`.
    pub fn merge(&mut self, newer: &DateAvailabilityMap) {
        self.0.extend(newer.0.iter().map(|(d, a)| (*d, *a)));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, bool)> + '_ {
        self.0.iter().map(|(d, a)| (*d, *a))
    }

    /// Whether every day of `range` is present and free.
    ///
    /// This is the check that gates the "Request rental" button.
    pub fn is_range_available(&self, range: &DateRange) -> bool {
        range.days().all(|d| self.is_available(d))
    }

    /// Days marked unavailable, in order.
    pub fn unavailable_dates(&self) -> Vec<NaiveDate> {
        self.0
            .iter()
            .filter(|(_, available)| !**available)
            .map(|(d, _)| *d)
            .collect()
    }

    /// First known-free day on or after `date`.
    pub fn first_available_on_or_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.0
            .range(date..)
            .find(|(_, available)| **available)
            .map(|(d, _)| *d)
    }
}

// =============================================================================
// Block Reasons
// =============================================================================

/// Why a day cannot be rented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// The backend lists the day as booked.
    Booked,
    /// The day is reserved for delivering the item to a following rental.
    DeliveryBuffer,
    /// The day is reserved for getting the item back from a previous rental.
    ReturnBuffer,
    /// The day's month could not be loaded, so it cannot be confirmed free.
    Unverified,
}

/// Buffer zone around `periods` that `date` falls into, if any.
///
/// Checks periods in order and reports the first match. Returns `None` when
/// buffers are disabled.
pub fn buffer_block(
    date: NaiveDate,
    periods: &[RentalPeriod],
    buffers: &BufferSettings,
) -> Option<BlockReason> {
    if !buffers.enabled {
        return None;
    }
    let delivery = i64::from(buffers.delivery_buffer_days);
    let ret = i64::from(buffers.return_buffer_days);

    periods.iter().find_map(|period| {
        let before_start = (period.start - date).num_days();
        if (1..=delivery).contains(&before_start) {
            return Some(BlockReason::DeliveryBuffer);
        }
        let after_end = (date - period.end).num_days();
        if (1..=ret).contains(&after_end) {
            return Some(BlockReason::ReturnBuffer);
        }
        None
    })
}

/// Everything known about one day, given the merged inputs.
pub fn block_reason(
    date: NaiveDate,
    booked: &HashSet<NaiveDate>,
    periods: &[RentalPeriod],
    buffers: &BufferSettings,
    failed_months: &BTreeSet<YearMonth>,
) -> Option<BlockReason> {
    if failed_months.contains(&YearMonth::of(date)) {
        return Some(BlockReason::Unverified);
    }
    if booked.contains(&date) {
        return Some(BlockReason::Booked);
    }
    buffer_block(date, periods, buffers)
}

/// Builds the availability map for every day of `range`.
///
/// Days in `failed_months` are reported unavailable: a month whose bookings
/// could not be read must not look free.
pub fn merge_availability(
    range: &DateRange,
    booked: &HashSet<NaiveDate>,
    periods: &[RentalPeriod],
    buffers: &BufferSettings,
    failed_months: &BTreeSet<YearMonth>,
) -> DateAvailabilityMap {
    let mut map = DateAvailabilityMap::new();
    for date in range.days() {
        let blocked = block_reason(date, booked, periods, buffers, failed_months).is_some();
        map.insert(date, !blocked);
    }
    map
}

// =============================================================================
// Outcome
// =============================================================================

/// Result of checking a date range, including which months actually loaded.
///
/// Callers decide whether partial data is good enough to show; a non-empty
/// `failed_months` always means submission should stay disabled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AvailabilityOutcome {
    pub map: DateAvailabilityMap,
    /// Months of the lookup window that loaded. The window is the range
    /// widened by the buffer days, so it can include neighbouring months.
    #[ts(as = "Vec<String>")]
    pub committed_months: BTreeSet<YearMonth>,
    /// Months of the same window that failed to load.
    #[ts(as = "Vec<String>")]
    pub failed_months: BTreeSet<YearMonth>,
}

impl AvailabilityOutcome {
    /// Whether every month of the range loaded.
    pub fn is_complete(&self) -> bool {
        self.failed_months.is_empty()
    }

    /// Whether the whole range can be booked: complete data and every day free.
    pub fn can_book(&self, range: &DateRange) -> bool {
        self.is_complete() && self.map.is_range_available(range)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
