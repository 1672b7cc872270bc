//! # Error Types
//!
//! Domain-specific error types for lendly-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lendly-core errors (this file)                                        │
//! │  ├── CoreError        - Pricing / availability domain errors           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  lendly-client errors (separate crate)                                 │
//! │  └── ClientError      - Config, transport and API failures             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → CLI / display layer │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A price tier carries a negative amount.
    ///
    /// ## When This Occurs
    /// - Product data from the API is corrupt
    /// - A tier was entered with the wrong sign in the listing form
    #[error("Invalid {tier} price: {reason}")]
    InvalidPrice { tier: String, reason: String },

    /// A date range has its end before its start.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// The `Display` text is what the rental form shows under the date fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Invalid format (e.g., unparseable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// One or both rental dates were left empty.
    #[error("start date and end date are required")]
    DatesRequired,

    /// Rental end is not after rental start.
    #[error("End date must be after start date")]
    EndNotAfterStart,

    /// Rental is shorter than the product allows.
    #[error("Minimum rental duration is {min} day(s), selected {days}")]
    DurationTooShort { min: i64, days: i64 },

    /// Rental is longer than the product allows.
    #[error("Maximum rental duration is {max} day(s), selected {days}")]
    DurationTooLong { max: i64, days: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidPrice {
            tier: "weekly".to_string(),
            reason: "must not be negative".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid weekly price: must not be negative");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::DatesRequired.to_string(),
            "start date and end date are required"
        );

        let err = ValidationError::InvalidFormat {
            field: "end date".to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        };
        assert_eq!(err.to_string(), "end date has invalid format: expected YYYY-MM-DD");

        let err = ValidationError::DurationTooShort { min: 3, days: 1 };
        assert_eq!(err.to_string(), "Minimum rental duration is 3 day(s), selected 1");

        assert_eq!(
            ValidationError::EndNotAfterStart.to_string(),
            "End date must be after start date"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::EndNotAfterStart.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
