//! Snapshot aggregation over recorded visits and project views
//!
//! Every figure in a snapshot comes from its own storage query. The queries
//! run concurrently without a shared transaction, so a snapshot taken during
//! a burst of writes may count a visit in one figure and not yet in another.
//! Any failing query fails the whole snapshot.

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::analytics::models::{DailyCount, PageCount, ProjectCount, RecentVisit};
use crate::storage::Storage;

pub const TOP_PAGES_LIMIT: i64 = 10;
pub const POPULAR_PROJECTS_LIMIT: i64 = 10;
pub const RECENT_ACTIVITY_LIMIT: i64 = 20;

/// Lower bounds (Unix milliseconds) of the reporting windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    /// Start of the current UTC calendar day
    pub today: i64,
    /// Rolling seven days before now
    pub week: i64,
    /// Rolling thirty days before now
    pub month: i64,
}

impl Windows {
    pub fn at(now: DateTime<Utc>) -> Self {
        let start_of_day = now.date_naive().and_time(NaiveTime::MIN).and_utc();

        Self {
            today: start_of_day.timestamp_millis(),
            week: (now - ChronoDuration::days(7)).timestamp_millis(),
            month: (now - ChronoDuration::days(30)).timestamp_millis(),
        }
    }
}

/// Aggregator output before it is shaped into the reported snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSnapshot {
    pub total_visits: i64,
    pub visits_today: i64,
    pub visits_this_week: i64,
    pub visits_this_month: i64,
    /// Distinct identifier hashes; approximate because truncated hashes can collide
    pub unique_visitors_today: i64,
    pub unique_visitors_this_week: i64,
    pub top_pages: Vec<PageCount>,
    pub popular_projects: Vec<ProjectCount>,
    pub daily_visits: Vec<DailyCount>,
    pub recent_activity: Vec<RecentVisit>,
}

pub struct AnalyticsAggregator {
    storage: Arc<dyn Storage>,
    timeout: Duration,
}

impl AnalyticsAggregator {
    pub fn new(storage: Arc<dyn Storage>, timeout: Duration) -> Self {
        Self { storage, timeout }
    }

    /// Compute all snapshot figures relative to `now`
    pub async fn compute_snapshot(&self, now: DateTime<Utc>) -> AnalyticsResult<RawSnapshot> {
        let windows = Windows::at(now);
        debug!(?windows, "computing analytics snapshot");

        match tokio::time::timeout(self.timeout, self.run_queries(windows)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.timeout, "analytics snapshot timed out");
                Err(AnalyticsError::Timeout(self.timeout))
            }
        }
    }

    async fn run_queries(&self, windows: Windows) -> AnalyticsResult<RawSnapshot> {
        let storage = self.storage.as_ref();

        let (
            total_visits,
            visits_today,
            visits_this_week,
            visits_this_month,
            unique_visitors_today,
            unique_visitors_this_week,
            top_pages,
            popular_projects,
            daily_visits,
            recent_activity,
        ) = tokio::try_join!(
            storage.count_visits(None),
            storage.count_visits(Some(windows.today)),
            storage.count_visits(Some(windows.week)),
            storage.count_visits(Some(windows.month)),
            storage.count_unique_visitors(windows.today),
            storage.count_unique_visitors(windows.week),
            storage.top_pages(TOP_PAGES_LIMIT),
            storage.popular_projects(POPULAR_PROJECTS_LIMIT),
            storage.daily_visits(windows.month),
            storage.recent_visits(RECENT_ACTIVITY_LIMIT),
        )?;

        Ok(RawSnapshot {
            total_visits,
            visits_today,
            visits_this_week,
            visits_this_month,
            unique_visitors_today,
            unique_visitors_this_week,
            top_pages,
            popular_projects,
            daily_visits,
            recent_activity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_windows_today_is_calendar_aligned() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 13, 45, 10).unwrap();
        let windows = Windows::at(now);

        let midnight = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(windows.today, midnight.timestamp_millis());
    }

    #[test]
    fn test_windows_week_and_month_are_rolling() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 13, 45, 10).unwrap();
        let windows = Windows::at(now);

        let week = Utc.with_ymd_and_hms(2026, 3, 8, 13, 45, 10).unwrap();
        let month = Utc.with_ymd_and_hms(2026, 2, 13, 13, 45, 10).unwrap();
        assert_eq!(windows.week, week.timestamp_millis());
        assert_eq!(windows.month, month.timestamp_millis());
    }
}
