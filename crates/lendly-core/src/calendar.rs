//! # Calendar Helpers
//!
//! Day-granular date handling shared by pricing, availability and validation.
//!
//! Every date here is a `chrono::NaiveDate`: rentals start and end on calendar
//! days, and the rental API exchanges dates as `YYYY-MM-DD` strings. Month keys
//! (`YYYY-MM`) address the per-month availability endpoints.

use chrono::{DateTime, Datelike, Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};

/// Format of date keys in availability maps and API payloads.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Parsing
// =============================================================================

/// Parses a date as the rental API and the date pickers produce it.
///
/// Accepts `YYYY-MM-DD` and RFC 3339 timestamps. For timestamps the calendar
/// date in the timestamp's own offset is used.
///
/// ```rust
/// use lendly_core::calendar::parse_api_date;
///
/// assert!(parse_api_date("2024-03-01").is_some());
/// assert_eq!(
///     parse_api_date("2024-03-01T22:00:00+02:00"),
///     parse_api_date("2024-03-01"),
/// );
/// assert!(parse_api_date("next tuesday").is_none());
/// ```
pub fn parse_api_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Serde adapter for API date fields (`YYYY-MM-DD` or RFC 3339).
pub mod api_date {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_api_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw:?}")))
    }

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(ISO_DATE_FORMAT))
    }
}

// =============================================================================
// Year-Month Key
// =============================================================================

/// A calendar month, rendered as `YYYY-MM`.
///
/// Availability and rentals are fetched one month at a time; this is the key
/// for those requests and for the month cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a month key; `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            YearMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Whether `date` falls in this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Every month touched by the inclusive range `[start, end]`, in order.
    ///
    /// Empty when `end < start`.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use lendly_core::calendar::YearMonth;
    ///
    /// let start = NaiveDate::from_ymd_opt(2023, 12, 20).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
    /// let keys: Vec<String> = YearMonth::spanning(start, end)
    ///     .iter()
    ///     .map(|m| m.to_string())
    ///     .collect();
    /// assert_eq!(keys, ["2023-12", "2024-01", "2024-02"]);
    /// ```
    pub fn spanning(start: NaiveDate, end: NaiveDate) -> Vec<YearMonth> {
        if end < start {
            return Vec::new();
        }
        let last = YearMonth::of(end);
        let mut months = Vec::new();
        let mut current = YearMonth::of(start);
        while current <= last {
            months.push(current);
            current = current.succ();
        }
        months
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "month".to_string(),
            reason: format!("expected YYYY-MM, got {s:?}"),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(with = "api_date")]
    pub start: NaiveDate,
    #[serde(with = "api_date")]
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if end < start {
            return Err(CoreError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(DateRange { start, end })
    }

    /// Number of days in the range, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Rental length from start to end: `end - start` in days.
    ///
    /// This is the count the duration check and the backend bill against.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether `date` lies inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterates every day of the range in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Months touched by the range.
    pub fn months(&self) -> Vec<YearMonth> {
        YearMonth::spanning(self.start, self.end)
    }

    /// Grows the range by `before` days at the start and `after` days at the end.
    ///
    /// Saturates at the calendar limits instead of failing.
    pub fn widen(&self, before: u32, after: u32) -> DateRange {
        DateRange {
            start: self
                .start
                .checked_sub_days(Days::new(u64::from(before)))
                .unwrap_or(NaiveDate::MIN),
            end: self
                .end
                .checked_add_days(Days::new(u64::from(after)))
                .unwrap_or(NaiveDate::MAX),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_api_date() {
        assert_eq!(parse_api_date("2024-01-10"), Some(date(2024, 1, 10)));
        assert_eq!(parse_api_date(" 2024-01-10 "), Some(date(2024, 1, 10)));
        assert_eq!(parse_api_date("2024-01-10T00:00:00Z"), Some(date(2024, 1, 10)));
        assert_eq!(parse_api_date("2024-13-01"), None);
        assert_eq!(parse_api_date(""), None);
    }

    #[test]
    fn test_year_month_display_and_parse() {
        let ym = YearMonth::new(2024, 3).unwrap();
        assert_eq!(ym.to_string(), "2024-03");
        assert_eq!("2024-03".parse::<YearMonth>().unwrap(), ym);
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("March".parse::<YearMonth>().is_err());
        assert!(YearMonth::new(2024, 0).is_none());
    }

    #[test]
    fn test_year_month_rollover() {
        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(dec.succ(), YearMonth::new(2024, 1).unwrap());
        assert!(dec.contains(date(2023, 12, 31)));
        assert!(!dec.contains(date(2024, 1, 1)));
    }

    #[test]
    fn test_spanning_single_and_empty() {
        assert_eq!(
            YearMonth::spanning(date(2024, 1, 5), date(2024, 1, 20)),
            vec![YearMonth::new(2024, 1).unwrap()]
        );
        assert!(YearMonth::spanning(date(2024, 2, 1), date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn test_date_range() {
        let range = DateRange::new(date(2024, 2, 27), date(2024, 3, 2)).unwrap();
        assert_eq!(range.len_days(), 5); // leap year: 27, 28, 29, 1, 2
        assert_eq!(range.span_days(), 4);
        assert_eq!(range.days().count(), 5);
        assert_eq!(range.months().len(), 2);
        assert!(range.contains(date(2024, 2, 29)));
        assert!(DateRange::new(date(2024, 3, 2), date(2024, 3, 1)).is_err());
    }

    #[test]
    fn test_widen() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        let wide = range.widen(2, 3);
        assert_eq!(wide.start, date(2024, 2, 28));
        assert_eq!(wide.end, date(2024, 4, 3));
        assert_eq!(wide.months().len(), 3);
    }

    #[test]
    fn test_year_month_serde() {
        let ym = YearMonth::new(2024, 7).unwrap();
        let json = serde_json::to_string(&ym).unwrap();
        assert_eq!(json, "\"2024-07\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym);
    }
}
