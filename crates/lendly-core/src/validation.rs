//! # Validation Module
//!
//! Rental duration checks for the booking form.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Duration Validation                                  │
//! │                                                                         │
//! │  start / end present? ───────────── no ──► DatesRequired               │
//! │           │                                                             │
//! │  both parse as dates? ───────────── no ──► InvalidFormat               │
//! │           │                                                             │
//! │  end > start? ───────────────────── no ──► EndNotAfterStart            │
//! │           │                                                             │
//! │  days = ceil((end - start) / 1 day)                                    │
//! │           │                                                             │
//! │  days >= min? ───────────────────── no ──► DurationTooShort            │
//! │  days <= max (if set)? ──────────── no ──► DurationTooLong             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │        Ok(days)                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lendly_core::validation::validate_duration;
//!
//! let check = validate_duration("2024-01-01", "2024-01-08", 1, Some(30));
//! assert!(check.is_valid);
//! assert_eq!(check.days, 7);
//! ```

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::calendar::ISO_DATE_FORMAT;
use crate::error::ValidationError;
use crate::types::RentalProduct;
use crate::DEFAULT_MIN_RENTAL_DAYS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MILLIS_PER_DAY: i64 = 86_400_000;

// =============================================================================
// Duration Check
// =============================================================================

/// Flat validation result, shaped for form display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DurationCheck {
    pub is_valid: bool,
    /// Whole rental days; 0 when the dates could not be compared.
    pub days: i64,
    pub error: Option<String>,
}

impl DurationCheck {
    fn valid(days: i64) -> Self {
        DurationCheck {
            is_valid: true,
            days,
            error: None,
        }
    }

    fn invalid(days: i64, error: &ValidationError) -> Self {
        DurationCheck {
            is_valid: false,
            days,
            error: Some(error.to_string()),
        }
    }
}

/// Parses a form date into an instant.
///
/// Plain `YYYY-MM-DD` values are taken as midnight UTC; timestamps keep their
/// time of day so partial days round up.
fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT) {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_field(field: &str, raw: &str) -> ValidationResult<DateTime<Utc>> {
    parse_instant(raw).ok_or_else(|| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("expected YYYY-MM-DD, got {:?}", raw.trim()),
    })
}

/// Whole days between two instants, rounding partial days up.
fn span_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds();
    // div_ceil on signed ints is unstable
    let days = millis / MILLIS_PER_DAY;
    if millis % MILLIS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

/// Counts the rental days between `start` and `end` and checks them against
/// the product limits.
///
/// ## Rules
/// - Both dates must be present and parseable
/// - `end` must be strictly after `start`
/// - `min_days <= days`, and `days <= max_days` when a maximum is set
///
/// ## Example
/// ```rust
/// use lendly_core::validation::check_duration;
/// use lendly_core::ValidationError;
///
/// assert_eq!(check_duration("2024-01-01", "2024-01-04", 1, None), Ok(3));
/// assert_eq!(
///     check_duration("2024-01-01", "2024-01-02", 3, None),
///     Err(ValidationError::DurationTooShort { min: 3, days: 1 })
/// );
/// ```
pub fn check_duration(
    start: &str,
    end: &str,
    min_days: i64,
    max_days: Option<i64>,
) -> ValidationResult<i64> {
    if start.trim().is_empty() || end.trim().is_empty() {
        return Err(ValidationError::DatesRequired);
    }

    let start = parse_field("start date", start)?;
    let end = parse_field("end date", end)?;

    if end <= start {
        return Err(ValidationError::EndNotAfterStart);
    }

    let days = span_days(start, end);

    if days < min_days {
        return Err(ValidationError::DurationTooShort {
            min: min_days,
            days,
        });
    }
    if let Some(max) = max_days {
        if days > max {
            return Err(ValidationError::DurationTooLong { max, days });
        }
    }

    Ok(days)
}

/// Form-friendly wrapper around [`check_duration`].
///
/// `days` is still reported when the range parses but breaks a limit, so the
/// form can show "selected N days" next to the error.
pub fn validate_duration(
    start: &str,
    end: &str,
    min_days: i64,
    max_days: Option<i64>,
) -> DurationCheck {
    match check_duration(start, end, min_days, max_days) {
        Ok(days) => DurationCheck::valid(days),
        Err(err) => {
            let days = match err {
                ValidationError::DurationTooShort { days, .. }
                | ValidationError::DurationTooLong { days, .. } => days,
                _ => 0,
            };
            DurationCheck::invalid(days, &err)
        }
    }
}

/// [`validate_duration`] with the default limits: at least one day, no maximum.
pub fn validate_duration_default(start: &str, end: &str) -> DurationCheck {
    validate_duration(start, end, DEFAULT_MIN_RENTAL_DAYS, None)
}

impl RentalProduct {
    /// Checks a requested rental against this product's own limits.
    pub fn validate_duration(&self, start: &str, end: &str) -> DurationCheck {
        validate_duration(start, end, self.min_days(), self.max_days())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_day_is_invalid() {
        let check = validate_duration_default("2024-01-10", "2024-01-10");
        assert!(!check.is_valid);
        assert_eq!(
            check.error.as_deref(),
            Some("End date must be after start date")
        );
    }

    #[test]
    fn test_one_week_within_limits() {
        let check = validate_duration("2024-01-01", "2024-01-08", 1, Some(30));
        assert_eq!(check, DurationCheck::valid(7));
    }

    #[test]
    fn test_missing_dates() {
        let check = validate_duration_default("", "2024-01-08");
        assert!(!check.is_valid);
        assert_eq!(
            check.error.as_deref(),
            Some("start date and end date are required")
        );
        assert!(!validate_duration_default("2024-01-01", "  ").is_valid);
    }

    #[test]
    fn test_unparseable_date() {
        let err = check_duration("01/02/2024", "2024-01-08", 1, None).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "start date"));
    }

    #[test]
    fn test_end_before_start() {
        assert_eq!(
            check_duration("2024-01-08", "2024-01-01", 1, None),
            Err(ValidationError::EndNotAfterStart)
        );
    }

    #[test]
    fn test_min_and_max_limits() {
        let short = validate_duration("2024-01-01", "2024-01-03", 3, None);
        assert!(!short.is_valid);
        assert_eq!(short.days, 2);
        assert_eq!(
            short.error.as_deref(),
            Some("Minimum rental duration is 3 day(s), selected 2")
        );

        let long = validate_duration("2024-01-01", "2024-03-01", 1, Some(30));
        assert!(!long.is_valid);
        assert_eq!(long.days, 60);

        assert!(validate_duration("2024-01-01", "2024-01-31", 1, Some(30)).is_valid);
    }

    #[test]
    fn test_partial_days_round_up() {
        assert_eq!(
            check_duration("2024-01-01T09:00:00Z", "2024-01-02T10:00:00Z", 1, None),
            Ok(2)
        );
        assert_eq!(
            check_duration("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z", 1, None),
            Ok(1)
        );
    }

    #[test]
    fn test_product_limits() {
        let product: RentalProduct = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Tent",
            "rental_price_per_day": 10,
            "min_rental_duration_days": 2,
            "max_rental_duration_days": 14
        }))
        .unwrap();

        assert!(!product.validate_duration("2024-05-01", "2024-05-02").is_valid);
        assert!(product.validate_duration("2024-05-01", "2024-05-03").is_valid);
        assert!(!product.validate_duration("2024-05-01", "2024-05-20").is_valid);
    }
}
