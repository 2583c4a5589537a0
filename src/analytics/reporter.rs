//! Shapes aggregator output into the reported analytics snapshot

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::analytics::aggregator::RawSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub overview: Overview,
    pub top_pages: Vec<TopPage>,
    pub popular_projects: Vec<PopularProject>,
    pub daily_visits: Vec<DailyVisits>,
    pub recent_activity: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_visits: i64,
    pub visits_today: i64,
    pub visits_this_week: i64,
    pub visits_this_month: i64,
    pub unique_visitors_today: i64,
    pub unique_visitors_this_week: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopPage {
    pub page: String,
    pub visits: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopularProject {
    pub id: i64,
    pub title: String,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyVisits {
    /// `YYYY-MM-DD`
    pub date: String,
    pub visits: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub page: String,
    /// RFC 3339, UTC, millisecond precision
    pub timestamp: String,
}

fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}

pub fn build_snapshot(raw: RawSnapshot) -> AnalyticsSnapshot {
    AnalyticsSnapshot {
        overview: Overview {
            total_visits: raw.total_visits,
            visits_today: raw.visits_today,
            visits_this_week: raw.visits_this_week,
            visits_this_month: raw.visits_this_month,
            unique_visitors_today: raw.unique_visitors_today,
            unique_visitors_this_week: raw.unique_visitors_this_week,
        },
        top_pages: raw
            .top_pages
            .into_iter()
            .map(|p| TopPage {
                page: p.page,
                visits: p.visits,
            })
            .collect(),
        popular_projects: raw
            .popular_projects
            .into_iter()
            .map(|p| PopularProject {
                id: p.project_id,
                title: p.project_title,
                views: p.views,
            })
            .collect(),
        daily_visits: raw
            .daily_visits
            .into_iter()
            .map(|d| DailyVisits {
                date: d.day,
                visits: d.visits,
            })
            .collect(),
        recent_activity: raw
            .recent_activity
            .into_iter()
            .map(|v| Activity {
                page: v.page,
                timestamp: format_timestamp(v.recorded_at),
            })
            .collect(),
    }
}
