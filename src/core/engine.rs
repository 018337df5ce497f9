use crate::core::aggregation::{build_forecast, empty_forecast};
use crate::core::calendar::{horizon, horizon_bounds, WeekWindow};
use crate::core::{ForecastResult, OwnerId, RecordStore};
use crate::utils::error::{PlannerError, Result};
use chrono::NaiveDate;
use std::future::Future;
use std::time::Duration;

/// Ceiling applied to each upstream fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ForecastEngine<S: RecordStore> {
    store: S,
    fetch_timeout: Duration,
}

impl<S: RecordStore> ForecastEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(store: S, fetch_timeout: Duration) -> Self {
        Self {
            store,
            fetch_timeout,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Forecast for the 12 weeks starting at the week of `today`.
    ///
    /// Never fails: a failed or timed-out fetch yields [`empty_forecast`], so callers
    /// render failure and an empty portfolio the same way.
    pub async fn forecast(&self, owner: &OwnerId, today: NaiveDate) -> ForecastResult {
        match self.try_forecast(owner, today).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("❌ Forecast for owner {} failed, returning empty forecast: {}", owner, e);
                empty_forecast(&horizon(today))
            }
        }
    }

    /// Same as [`forecast`](Self::forecast) but surfaces fetch errors.
    pub async fn try_forecast(&self, owner: &OwnerId, today: NaiveDate) -> Result<ForecastResult> {
        let weeks = horizon(today);
        let (range_start, range_end) = horizon_bounds(&weeks).ok_or_else(|| {
            PlannerError::ConfigError {
                message: "forecast horizon is empty".to_string(),
            }
        })?;

        tracing::debug!(
            "Fetching planning data for owner {} ({} .. {})",
            owner,
            range_start,
            range_end
        );

        // 兩個查詢互不相依，同時發出，各自套用逾時
        let (consultants, allocations) = tokio::join!(
            self.bounded("consultants", self.store.list_consultants(owner)),
            self.bounded(
                "allocations",
                self.store
                    .list_allocations_overlapping(owner, range_start, range_end)
            ),
        );
        let consultants = consultants?;
        let mut allocations = allocations?;

        let fetched = allocations.len();
        allocations.retain(|r| in_horizon(&weeks, r.allocation.start_date, r.allocation.end_date));
        if allocations.len() < fetched {
            tracing::warn!(
                "⚠️ Store returned {} allocations outside the horizon, ignoring them",
                fetched - allocations.len()
            );
        }

        tracing::debug!(
            "Fetched {} consultants and {} allocations",
            consultants.len(),
            allocations.len()
        );

        let result = build_forecast(&weeks, &consultants, &allocations);

        tracing::info!(
            "📊 Forecast built: {} consultants, {} on the bench",
            result.total_consultants,
            result.bench.len()
        );

        Ok(result)
    }

    async fn bounded<T, F>(&self, operation: &str, fetch: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(PlannerError::TimeoutError {
                operation: operation.to_string(),
                seconds: self.fetch_timeout.as_secs(),
            }),
        }
    }
}

fn in_horizon(weeks: &[WeekWindow], start: NaiveDate, end: NaiveDate) -> bool {
    match horizon_bounds(weeks) {
        Some((first, last)) => WeekWindow { start: first, end: last }.overlaps(start, end),
        None => false,
    }
}
