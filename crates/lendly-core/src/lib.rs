//! # lendly-core: Pure Pricing and Availability Logic for Lendly
//!
//! This crate holds the rules behind the rental booking flow as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lendly Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/cli (lendly)                            │   │
//! │  │       quote ──► availability ──► validate                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lendly-client                                │   │
//! │  │   REST data source, month cache, generation guard, quotes      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lendly-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐ │   │
//! │  │   │  pricing  │  │   money   │  │availability│  │ validation│ │   │
//! │  │   │ optimizer │  │   Money   │  │   merge    │  │ duration  │ │   │
//! │  │   │ subtotals │  │  decimal  │  │  buffers   │  │  limits   │ │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (RentalProduct, PriceTiers, BufferSettings, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`calendar`] - Date parsing, month keys and date ranges
//! - [`pricing`] - Rental type optimizer and subtotal calculator
//! - [`availability`] - Booked dates + rental buffers → per-day availability
//! - [`validation`] - Rental duration checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use lendly_core::money::Money;
//! use lendly_core::pricing::optimal_rental_type;
//! use lendly_core::types::{PriceTiers, RentalType};
//!
//! let tiers = PriceTiers::daily(Money::from_cents(100))
//!     .with_week(Money::from_cents(600))
//!     .with_month(Money::from_cents(2500));
//!
//! let best = optimal_rental_type(14, &tiers);
//! assert_eq!(best.rental_type, RentalType::Weekly);
//! assert_eq!(best.savings.cents(), 200);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod calendar;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use availability::{AvailabilityOutcome, BlockReason, DateAvailabilityMap};
pub use calendar::{DateRange, YearMonth};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{OptimalRentalInfo, RentalSelection, TierBreakdown};
pub use types::*;
pub use validation::DurationCheck;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Days billed by one weekly unit.
pub const DAYS_PER_WEEK: i64 = 7;

/// Days billed by one monthly unit.
///
/// Pricing uses a flat 30-day month regardless of the calendar.
pub const DAYS_PER_MONTH: i64 = 30;

/// Minimum rental length when a product does not set its own.
pub const DEFAULT_MIN_RENTAL_DAYS: i64 = 1;
