//! # Session Caches
//!
//! Month data and buffer settings, kept for the lifetime of the service.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MonthCache                                                             │
//! │  (product_id, YYYY-MM) ──► MonthData { booked_dates, rentals }          │
//! │                                                                         │
//! │  • append-only: entries are never invalidated within a session          │
//! │  • only months whose fetches BOTH succeeded are stored                  │
//! │                                                                         │
//! │  BufferSettingsMemo                                                     │
//! │  Option<BufferSettings>, filled once with a read-then-write check       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use lendly_core::{BufferSettings, RentalPeriod, YearMonth};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ClientResult;

/// Everything fetched for one product and one month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthData {
    pub booked_dates: Vec<NaiveDate>,
    pub rentals: Vec<RentalPeriod>,
}

type MonthKey = (String, YearMonth);

// =============================================================================
// Month Cache
// =============================================================================

/// Per-product, per-month fetch results.
#[derive(Debug, Clone, Default)]
pub struct MonthCache {
    entries: Arc<RwLock<HashMap<MonthKey, Arc<MonthData>>>>,
}

impl MonthCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, product_id: &str, month: YearMonth) -> Option<Arc<MonthData>> {
        self.entries
            .read()
            .await
            .get(&(product_id.to_string(), month))
            .cloned()
    }

    /// Stores a month. An existing entry is kept: the first successful fetch
    /// wins for the session.
    pub async fn insert(&self, product_id: &str, month: YearMonth, data: MonthData) -> Arc<MonthData> {
        let mut entries = self.entries.write().await;
        entries
            .entry((product_id.to_string(), month))
            .or_insert_with(|| Arc::new(data))
            .clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

// =============================================================================
// Buffer Settings Memo
// =============================================================================

/// Buffer settings, loaded once per session.
#[derive(Debug, Clone, Default)]
pub struct BufferSettingsMemo {
    value: Arc<RwLock<Option<BufferSettings>>>,
}

impl BufferSettingsMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized settings, running `load` on first use.
    ///
    /// A failed load is not memoized, so the next call tries again.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> ClientResult<BufferSettings>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<BufferSettings>>,
    {
        {
            let guard = self.value.read().await;
            if let Some(settings) = *guard {
                return Ok(settings);
            }
        }

        let mut guard = self.value.write().await;

        // Double-check after acquiring write lock
        if let Some(settings) = *guard {
            return Ok(settings);
        }

        let settings = load().await?;
        debug!(?settings, "Buffer settings loaded");
        *guard = Some(settings);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn march() -> YearMonth {
        YearMonth::new(2024, 3).unwrap()
    }

    #[tokio::test]
    async fn test_month_cache_first_insert_wins() {
        let cache = MonthCache::new();
        let first = MonthData {
            booked_dates: vec![NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()],
            rentals: vec![],
        };
        cache.insert("p1", march(), first.clone()).await;
        let kept = cache.insert("p1", march(), MonthData::default()).await;

        assert_eq!(*kept, first);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("p2", march()).await.is_none());
    }

    #[tokio::test]
    async fn test_memo_loads_once() {
        let memo = BufferSettingsMemo::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let settings = memo
                .get_or_load(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(BufferSettings::new(2, 1))
                })
                .await
                .unwrap();
            assert_eq!(settings.delivery_buffer_days, 2);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_memo_does_not_keep_failures() {
        let memo = BufferSettingsMemo::new();

        let err = memo
            .get_or_load(|| async { Err(ClientError::Timeout(10)) })
            .await;
        assert!(err.is_err());

        let ok = memo
            .get_or_load(|| async { Ok(BufferSettings::disabled()) })
            .await;
        assert_eq!(ok.unwrap(), BufferSettings::disabled());

        // Memoized now: a failing loader is never consulted.
        let again = memo
            .get_or_load(|| async { Err(ClientError::Timeout(10)) })
            .await;
        assert_eq!(again.unwrap(), BufferSettings::disabled());
    }
}
