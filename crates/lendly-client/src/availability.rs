//! # Availability Service
//!
//! Loads booked dates and rentals month by month, merges them with the buffer
//! settings, and publishes the result to an [`AvailabilityBoard`].
//!
//! ## Refresh Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  refresh(board, product, range)                                         │
//! │    │                                                                    │
//! │    ├─► board.begin() ──► token N                                        │
//! │    │                                                                    │
//! │    ├─► buffer settings (memoized) ── error ──► board error, no submit   │
//! │    │                                                                    │
//! │    ├─► lookup window = range widened by return / delivery buffers       │
//! │    │                                                                    │
//! │    ├─► for each month in window (concurrently):                         │
//! │    │     cached? ──► reuse                                              │
//! │    │     else join!(booked_dates, rentals) ──► ok: cache │ err: failed  │
//! │    │                                                                    │
//! │    ├─► merge_availability(range, booked, rentals, buffers, failed)      │
//! │    │                                                                    │
//! │    └─► board.commit(N, outcome) ──► Applied │ Stale                     │
//! │          Applied: outcome replaces the current one and its days are     │
//! │          merged into the board's running map                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use futures_util::future::join_all;
use lendly_core::availability::merge_availability;
use lendly_core::{
    AvailabilityOutcome, BufferSettings, DateAvailabilityMap, DateRange, RentalPeriod, YearMonth,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::api::RentalDataSource;
use crate::cache::{BufferSettingsMemo, MonthCache, MonthData};
use crate::error::ClientResult;
use crate::generation::{Commit, GenerationCounter, GenerationToken};

/// Shown in place of the calendar when availability could not be loaded.
pub const AVAILABILITY_ERROR_MESSAGE: &str = "Could not verify availability. Please try again.";

// =============================================================================
// Service
// =============================================================================

/// Fetches and merges availability for any product.
///
/// Holds the month cache and buffer-settings memo for the session; construct
/// once and share behind an `Arc`.
#[derive(Debug)]
pub struct AvailabilityService<S> {
    source: Arc<S>,
    months: MonthCache,
    buffers: BufferSettingsMemo,
}

impl<S: RentalDataSource> AvailabilityService<S> {
    pub fn new(source: Arc<S>) -> Self {
        AvailabilityService {
            source,
            months: MonthCache::new(),
            buffers: BufferSettingsMemo::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn month_cache(&self) -> &MonthCache {
        &self.months
    }

    /// Buffer settings, fetched on first use.
    pub async fn buffer_settings(&self) -> ClientResult<BufferSettings> {
        self.buffers
            .get_or_load(|| self.source.buffer_settings())
            .await
    }

    /// One month's data, from cache or from the backend.
    ///
    /// Booked dates and rentals are requested together; the month is cached
    /// only when both succeed.
    async fn load_month(&self, product_id: &str, month: YearMonth) -> ClientResult<Arc<MonthData>> {
        if let Some(cached) = self.months.get(product_id, month).await {
            debug!(product_id, %month, "Month served from cache");
            return Ok(cached);
        }

        let (booked, rentals) = tokio::join!(
            self.source.booked_dates(product_id, month),
            self.source.rentals(product_id, month),
        );

        let data = MonthData {
            booked_dates: booked?,
            rentals: rentals?,
        };
        debug!(
            product_id,
            %month,
            booked = data.booked_dates.len(),
            rentals = data.rentals.len(),
            "Month fetched"
        );
        Ok(self.months.insert(product_id, month, data).await)
    }

    /// Computes availability for every day of `range`.
    ///
    /// Every month of the buffer-widened window lands in either
    /// `committed_months` or `failed_months`. Days of failed months are
    /// reported unavailable. Fails as a whole only when the buffer settings
    /// cannot be loaded.
    pub async fn check(&self, product_id: &str, range: DateRange) -> ClientResult<AvailabilityOutcome> {
        let buffers = self.buffer_settings().await?;

        // Rentals just outside the range can still reach into it with their buffers.
        let window = range.widen(buffers.effective_return_days(), buffers.effective_delivery_days());

        let results = join_all(window.months().into_iter().map(|month| async move {
            (month, self.load_month(product_id, month).await)
        }))
        .await;

        let mut booked: HashSet<NaiveDate> = HashSet::new();
        let mut periods: HashSet<RentalPeriod> = HashSet::new();
        let mut committed_months = BTreeSet::new();
        let mut failed_months = BTreeSet::new();

        for (month, result) in results {
            match result {
                Ok(data) => {
                    booked.extend(data.booked_dates.iter().copied());
                    periods.extend(data.rentals.iter().copied());
                    committed_months.insert(month);
                }
                Err(e) => {
                    warn!(product_id, %month, error = %e, "Failed to load availability month");
                    failed_months.insert(month);
                }
            }
        }

        let mut periods: Vec<RentalPeriod> = periods.into_iter().collect();
        periods.sort_by_key(|p| (p.start, p.end));

        let map = merge_availability(&range, &booked, &periods, &buffers, &failed_months);

        Ok(AvailabilityOutcome {
            map,
            committed_months,
            failed_months,
        })
    }

    /// Recomputes `range` and publishes it to `board` unless a newer refresh
    /// was started meanwhile.
    pub async fn refresh(&self, board: &AvailabilityBoard, product_id: &str, range: DateRange) -> Commit {
        let token = board.begin().await;
        debug!(product_id, generation = %token, start = %range.start, end = %range.end, "Refreshing availability");
        let result = self.check(product_id, range).await;
        board.commit(token, range, result).await
    }
}

// =============================================================================
// Board
// =============================================================================

/// What the booking view renders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BoardSnapshot {
    pub generation: Option<u64>,
    pub range: Option<DateRange>,
    pub outcome: Option<AvailabilityOutcome>,
    /// Every day committed so far, newest result winning per day.
    pub known: DateAvailabilityMap,
    pub error: Option<String>,
    pub loading: bool,
}

/// The latest committed availability for one product view.
///
/// Only the newest refresh can write here; see [`crate::generation`].
#[derive(Debug, Default)]
pub struct AvailabilityBoard {
    generation: GenerationCounter,
    state: RwLock<BoardSnapshot>,
}

impl AvailabilityBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a refresh and marks the board as loading.
    pub async fn begin(&self) -> GenerationToken {
        let token = self.generation.issue();
        self.state.write().await.loading = true;
        token
    }

    /// Publishes a finished refresh if `token` is still the newest.
    pub async fn commit(
        &self,
        token: GenerationToken,
        range: DateRange,
        result: ClientResult<AvailabilityOutcome>,
    ) -> Commit {
        let mut state = self.state.write().await;

        // Checked under the write lock so two commits cannot interleave.
        if !self.generation.is_current(token) {
            let latest = self.generation.latest().unwrap_or(token);
            info!(generation = %token, latest = %latest, "Discarding stale availability result");
            return Commit::Stale { token, latest };
        }

        state.generation = Some(token.value());
        state.range = Some(range);
        state.loading = false;

        match result {
            Ok(outcome) => {
                if !outcome.is_complete() {
                    warn!(
                        generation = %token,
                        failed = outcome.failed_months.len(),
                        "Availability committed with unverified months"
                    );
                }
                state.known.merge(&outcome.map);
                state.outcome = Some(outcome);
                state.error = None;
            }
            Err(e) => {
                error!(generation = %token, error = %e, "Availability refresh failed");
                state.outcome = None;
                state.error = Some(AVAILABILITY_ERROR_MESSAGE.to_string());
            }
        }

        Commit::Applied
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        self.state.read().await.clone()
    }

    /// Availability of one day across every committed refresh.
    pub async fn is_available(&self, date: NaiveDate) -> Option<bool> {
        self.state.read().await.known.get(date)
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Whether a rental request for `range` may be sent.
    ///
    /// Requires a committed, complete result with every day free and no error.
    pub async fn can_submit(&self, range: &DateRange) -> bool {
        let state = self.state.read().await;
        state.error.is_none()
            && state
                .outcome
                .as_ref()
                .is_some_and(|outcome| outcome.can_book(range))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use lendly_core::RentalProduct;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    /// In-memory backend with per-month data and switchable failures.
    #[derive(Default)]
    struct FakeSource {
        buffers: Option<BufferSettings>,
        booked: HashMap<YearMonth, Vec<NaiveDate>>,
        rentals: HashMap<YearMonth, Vec<RentalPeriod>>,
        failing: Mutex<HashSet<YearMonth>>,
        month_calls: AtomicUsize,
        settings_calls: AtomicUsize,
    }

    impl FakeSource {
        fn with_buffers(buffers: BufferSettings) -> Self {
            FakeSource {
                buffers: Some(buffers),
                ..Default::default()
            }
        }

        fn book(mut self, period: RentalPeriod) -> Self {
            for day in range(period.start, period.end).days() {
                self.booked.entry(YearMonth::of(day)).or_default().push(day);
            }
            for month in YearMonth::spanning(period.start, period.end) {
                self.rentals.entry(month).or_default().push(period);
            }
            self
        }

        fn fail(&self, month: YearMonth) {
            self.failing.lock().unwrap().insert(month);
        }

        fn heal(&self, month: YearMonth) {
            self.failing.lock().unwrap().remove(&month);
        }

        fn check_month(&self, month: YearMonth) -> ClientResult<()> {
            if self.failing.lock().unwrap().contains(&month) {
                return Err(ClientError::Api {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            Ok(())
        }
    }

    impl RentalDataSource for FakeSource {
        async fn booked_dates(&self, _product_id: &str, month: YearMonth) -> ClientResult<Vec<NaiveDate>> {
            self.month_calls.fetch_add(1, Ordering::SeqCst);
            self.check_month(month)?;
            Ok(self.booked.get(&month).cloned().unwrap_or_default())
        }

        async fn rentals(&self, _product_id: &str, month: YearMonth) -> ClientResult<Vec<RentalPeriod>> {
            self.check_month(month)?;
            Ok(self.rentals.get(&month).cloned().unwrap_or_default())
        }

        async fn buffer_settings(&self) -> ClientResult<BufferSettings> {
            self.settings_calls.fetch_add(1, Ordering::SeqCst);
            self.buffers.ok_or(ClientError::Api {
                status: 500,
                message: "settings down".into(),
            })
        }

        async fn product(&self, product_id: &str) -> ClientResult<RentalProduct> {
            Err(ClientError::Api {
                status: 404,
                message: format!("no product {product_id}"),
            })
        }
    }

    #[tokio::test]
    async fn test_check_applies_booked_dates_and_buffers() {
        let source = FakeSource::with_buffers(BufferSettings::new(2, 1))
            .book(RentalPeriod::new(date(2024, 3, 10), date(2024, 3, 12)));
        let service = AvailabilityService::new(Arc::new(source));

        let outcome = service
            .check("p1", range(date(2024, 3, 1), date(2024, 3, 31)))
            .await
            .unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.map.len(), 31);
        let blocked: Vec<u32> = outcome
            .map
            .unavailable_dates()
            .iter()
            .map(|d| chrono::Datelike::day(d))
            .collect();
        assert_eq!(blocked, vec![8, 9, 10, 11, 12, 13]);
    }

    #[tokio::test]
    async fn test_rental_in_next_month_blocks_via_delivery_buffer() {
        let source = FakeSource::with_buffers(BufferSettings::new(3, 0))
            .book(RentalPeriod::new(date(2024, 4, 2), date(2024, 4, 5)));
        let service = AvailabilityService::new(Arc::new(source));

        let outcome = service
            .check("p1", range(date(2024, 3, 25), date(2024, 3, 31)))
            .await
            .unwrap();

        assert_eq!(outcome.map.get(date(2024, 3, 29)), Some(true));
        assert_eq!(outcome.map.get(date(2024, 3, 30)), Some(false));
        assert_eq!(outcome.map.get(date(2024, 3, 31)), Some(false));
        assert_eq!(outcome.committed_months, [ym(2024, 3), ym(2024, 4)].into());
        assert!(outcome.failed_months.is_empty());
    }

    #[tokio::test]
    async fn test_window_months_reported_on_both_sides() {
        // Range ends on March 31; the delivery buffer pulls April into the window.
        let source = FakeSource::with_buffers(BufferSettings::new(2, 0));
        source.fail(ym(2024, 4));
        let service = AvailabilityService::new(Arc::new(source));

        let outcome = service
            .check("p1", range(date(2024, 3, 1), date(2024, 3, 31)))
            .await
            .unwrap();
        assert_eq!(outcome.committed_months, [ym(2024, 3)].into());
        assert_eq!(outcome.failed_months, [ym(2024, 4)].into());
        assert!(!outcome.is_complete());
    }

    #[tokio::test]
    async fn test_failed_month_reported_unavailable() {
        let source = FakeSource::with_buffers(BufferSettings::disabled());
        source.fail(ym(2024, 4));
        let service = AvailabilityService::new(Arc::new(source));

        let outcome = service
            .check("p1", range(date(2024, 3, 30), date(2024, 4, 2)))
            .await
            .unwrap();

        assert_eq!(outcome.failed_months, [ym(2024, 4)].into());
        assert_eq!(outcome.committed_months, [ym(2024, 3)].into());
        assert_eq!(outcome.map.get(date(2024, 3, 31)), Some(true));
        assert_eq!(outcome.map.get(date(2024, 4, 1)), Some(false));
        assert_eq!(outcome.map.get(date(2024, 4, 2)), Some(false));
    }

    #[tokio::test]
    async fn test_cached_months_not_refetched_failed_months_are() {
        let source = Arc::new(FakeSource::with_buffers(BufferSettings::disabled()));
        source.fail(ym(2024, 4));
        let service = AvailabilityService::new(Arc::clone(&source));
        let spring = range(date(2024, 3, 1), date(2024, 4, 30));

        service.check("p1", spring).await.unwrap();
        assert_eq!(source.month_calls.load(Ordering::SeqCst), 2);

        // March is cached, April failed and is asked for again.
        source.heal(ym(2024, 4));
        let outcome = service.check("p1", spring).await.unwrap();
        assert_eq!(source.month_calls.load(Ordering::SeqCst), 3);
        assert!(outcome.is_complete());

        service.check("p1", spring).await.unwrap();
        assert_eq!(source.month_calls.load(Ordering::SeqCst), 3);
        assert_eq!(source.settings_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.month_cache().len().await, 2);
    }

    #[tokio::test]
    async fn test_settings_failure_blocks_submission() {
        let service = AvailabilityService::new(Arc::new(FakeSource::default()));
        let board = AvailabilityBoard::new();
        let march = range(date(2024, 3, 1), date(2024, 3, 3));

        let commit = service.refresh(&board, "p1", march).await;
        assert!(commit.is_applied());
        assert_eq!(board.error().await.as_deref(), Some(AVAILABILITY_ERROR_MESSAGE));
        assert!(!board.can_submit(&march).await);
    }

    #[tokio::test]
    async fn test_board_can_submit() {
        let source = FakeSource::with_buffers(BufferSettings::disabled())
            .book(RentalPeriod::new(date(2024, 3, 10), date(2024, 3, 12)));
        let service = AvailabilityService::new(Arc::new(source));
        let board = AvailabilityBoard::new();

        service
            .refresh(&board, "p1", range(date(2024, 3, 1), date(2024, 3, 31)))
            .await;

        assert!(board.can_submit(&range(date(2024, 3, 1), date(2024, 3, 9))).await);
        assert!(!board.can_submit(&range(date(2024, 3, 9), date(2024, 3, 10))).await);
        assert!(!board.can_submit(&range(date(2024, 4, 1), date(2024, 4, 2))).await);
        assert_eq!(board.is_available(date(2024, 3, 11)).await, Some(false));
        assert!(!board.snapshot().await.loading);
    }

    #[tokio::test]
    async fn test_board_keeps_earlier_months() {
        let source = FakeSource::with_buffers(BufferSettings::disabled())
            .book(RentalPeriod::new(date(2024, 1, 5), date(2024, 1, 6)))
            .book(RentalPeriod::new(date(2024, 2, 5), date(2024, 2, 6)));
        let service = AvailabilityService::new(Arc::new(source));
        let board = AvailabilityBoard::new();
        let january = range(date(2024, 1, 1), date(2024, 1, 31));
        let february = range(date(2024, 2, 1), date(2024, 2, 29));

        service.refresh(&board, "p1", january).await;
        assert_eq!(board.is_available(date(2024, 1, 5)).await, Some(false));

        service.refresh(&board, "p1", february).await;
        assert_eq!(board.is_available(date(2024, 1, 5)).await, Some(false));
        assert_eq!(board.is_available(date(2024, 1, 20)).await, Some(true));
        assert_eq!(board.is_available(date(2024, 2, 5)).await, Some(false));

        let snapshot = board.snapshot().await;
        assert_eq!(snapshot.known.len(), 31 + 29);
        assert_eq!(snapshot.range, Some(february));
        // Submission follows the latest result only.
        assert!(board.can_submit(&range(date(2024, 2, 10), date(2024, 2, 12))).await);
        assert!(!board.can_submit(&range(date(2024, 1, 10), date(2024, 1, 12))).await);
    }

    /// Source whose January booked-dates call blocks until released.
    struct GatedSource {
        entered: Notify,
        release: Notify,
    }

    impl RentalDataSource for GatedSource {
        async fn booked_dates(&self, _product_id: &str, month: YearMonth) -> ClientResult<Vec<NaiveDate>> {
            if month == ym(2024, 1) {
                self.entered.notify_one();
                self.release.notified().await;
                return Ok(vec![date(2024, 1, 5)]);
            }
            Ok(vec![date(2024, 3, 5)])
        }

        async fn rentals(&self, _product_id: &str, _month: YearMonth) -> ClientResult<Vec<RentalPeriod>> {
            Ok(Vec::new())
        }

        async fn buffer_settings(&self) -> ClientResult<BufferSettings> {
            Ok(BufferSettings::disabled())
        }

        async fn product(&self, _product_id: &str) -> ClientResult<RentalProduct> {
            Err(ClientError::Timeout(1))
        }
    }

    #[tokio::test]
    async fn test_stale_refresh_is_discarded() {
        let source = Arc::new(GatedSource {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let service = Arc::new(AvailabilityService::new(Arc::clone(&source)));
        let board = Arc::new(AvailabilityBoard::new());

        let january = range(date(2024, 1, 1), date(2024, 1, 10));
        let march = range(date(2024, 3, 1), date(2024, 3, 10));

        let slow = {
            let service = Arc::clone(&service);
            let board = Arc::clone(&board);
            tokio::spawn(async move { service.refresh(&board, "p1", january).await })
        };

        // Wait until the January fetch is in flight, then overtake it.
        source.entered.notified().await;
        let fast = service.refresh(&board, "p1", march).await;
        assert_eq!(fast, Commit::Applied);

        source.release.notify_one();
        let slow = slow.await.unwrap();
        assert!(matches!(slow, Commit::Stale { .. }));

        let snapshot = board.snapshot().await;
        assert_eq!(snapshot.range, Some(march));
        assert_eq!(board.is_available(date(2024, 3, 5)).await, Some(false));
        assert_eq!(board.is_available(date(2024, 1, 5)).await, None);
    }
}
