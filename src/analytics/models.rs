//! Data models for analytics

use serde::{Deserialize, Serialize};

/// A single tracked page visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Request path that was visited
    pub page: String,

    /// Salted hash of the client identifier, never the raw address
    pub identifier_hash: String,

    pub user_agent: String,

    /// Unix timestamp in milliseconds
    pub recorded_at: i64,
}

/// A single view of a portfolio project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectViewRecord {
    pub project_id: i64,

    /// Title as sent by the client at view time; not kept in sync with the project
    pub project_title: String,

    pub identifier_hash: String,

    /// Unix timestamp in milliseconds
    pub recorded_at: i64,
}

/// Visit count for one page
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PageCount {
    pub page: String,
    pub visits: i64,
}

/// View count for one project, titled by its most recent view
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProjectCount {
    pub project_id: i64,
    pub project_title: String,
    pub views: i64,
}

/// Visit count for one UTC calendar day (`YYYY-MM-DD`)
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DailyCount {
    pub day: String,
    pub visits: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RecentVisit {
    pub page: String,
    pub recorded_at: i64,
}
