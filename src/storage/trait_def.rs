use crate::analytics::models::{
    DailyCount, PageCount, ProjectCount, ProjectViewRecord, RecentVisit, VisitRecord,
};
use crate::models::{NewProject, Project};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables and indexes)
    async fn init(&self) -> Result<()>;

    /// Persist a new project
    async fn create_project(&self, project: &NewProject) -> Result<Project>;

    /// List all projects, newest first
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Append a visit record
    async fn insert_visit(&self, visit: &VisitRecord) -> Result<()>;

    /// Append a project view record
    async fn insert_project_view(&self, view: &ProjectViewRecord) -> Result<()>;

    /// Count visits recorded at or after `since` (all visits when None)
    async fn count_visits(&self, since: Option<i64>) -> Result<i64>;

    /// Count distinct identifier hashes among visits recorded at or after `since`
    async fn count_unique_visitors(&self, since: i64) -> Result<i64>;

    /// Most visited pages, ties broken by first-seen order then page
    async fn top_pages(&self, limit: i64) -> Result<Vec<PageCount>>;

    /// Most viewed projects, ties broken by first-seen order then project id
    async fn popular_projects(&self, limit: i64) -> Result<Vec<ProjectCount>>;

    /// Visits per UTC day since `since`, ascending; days without visits are absent
    async fn daily_visits(&self, since: i64) -> Result<Vec<DailyCount>>;

    /// Latest visits, newest first
    async fn recent_visits(&self, limit: i64) -> Result<Vec<RecentVisit>>;

    /// Delete visits and project views recorded before `before`.
    /// Returns the number of deleted rows.
    async fn prune_analytics(&self, before: i64) -> Result<u64>;
}
