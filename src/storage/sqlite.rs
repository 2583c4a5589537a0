use crate::analytics::models::{
    DailyCount, PageCount, ProjectCount, ProjectViewRecord, RecentVisit, VisitRecord,
};
use crate::models::{NewProject, Project, ProjectRow};
use crate::storage::Storage;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                domain TEXT NOT NULL,
                description TEXT,
                tech_stack TEXT NOT NULL DEFAULT '[]',
                live_demo_url TEXT,
                github_url TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visits (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                page TEXT NOT NULL,
                identifier_hash TEXT NOT NULL,
                user_agent TEXT NOT NULL,
                recorded_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_visits_recorded_at ON visits(recorded_at)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_visits_page_recorded_at ON visits(page, recorded_at)",
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS project_views (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                project_title TEXT NOT NULL,
                identifier_hash TEXT NOT NULL,
                recorded_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_project_views_recorded_at ON project_views(recorded_at)",
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_project_views_project ON project_views(project_id, recorded_at)",
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project> {
        let now = chrono::Utc::now().timestamp_millis();
        let tech_stack = serde_json::to_string(&project.tech_stack)?;

        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO projects
                (title, domain, description, tech_stack, live_demo_url, github_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, domain, description, tech_stack, live_demo_url, github_url, created_at, updated_at
            "#,
        )
        .bind(&project.title)
        .bind(&project.domain)
        .bind(&project.description)
        .bind(tech_stack)
        .bind(&project.live_demo_url)
        .bind(&project.github_url)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(Project::try_from(row)?)
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, title, domain, description, tech_stack, live_demo_url, github_url, created_at, updated_at
            FROM projects
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter()
            .map(|row| Project::try_from(row).map_err(Into::into))
            .collect()
    }

    async fn insert_visit(&self, visit: &VisitRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO visits (page, identifier_hash, user_agent, recorded_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&visit.page)
        .bind(&visit.identifier_hash)
        .bind(&visit.user_agent)
        .bind(visit.recorded_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn insert_project_view(&self, view: &ProjectViewRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO project_views (project_id, project_title, identifier_hash, recorded_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(view.project_id)
        .bind(&view.project_title)
        .bind(&view.identifier_hash)
        .bind(view.recorded_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn count_visits(&self, since: Option<i64>) -> Result<i64> {
        let count = match since {
            Some(since) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM visits WHERE recorded_at >= ?")
                    .bind(since)
                    .fetch_one(self.pool.as_ref())
                    .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM visits")
                    .fetch_one(self.pool.as_ref())
                    .await?
            }
        };

        Ok(count)
    }

    async fn count_unique_visitors(&self, since: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT identifier_hash) FROM visits WHERE recorded_at >= ?",
        )
        .bind(since)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn top_pages(&self, limit: i64) -> Result<Vec<PageCount>> {
        let pages = sqlx::query_as::<_, PageCount>(
            r#"
            SELECT page, COUNT(*) AS visits
            FROM visits
            GROUP BY page
            ORDER BY visits DESC, MIN(recorded_at) ASC, page ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(pages)
    }

    async fn popular_projects(&self, limit: i64) -> Result<Vec<ProjectCount>> {
        let projects = sqlx::query_as::<_, ProjectCount>(
            r#"
            SELECT
                v.project_id AS project_id,
                (
                    SELECT p.project_title
                    FROM project_views p
                    WHERE p.project_id = v.project_id
                    ORDER BY p.recorded_at DESC, p.id DESC
                    LIMIT 1
                ) AS project_title,
                COUNT(*) AS views
            FROM project_views v
            GROUP BY v.project_id
            ORDER BY views DESC, MIN(v.recorded_at) ASC, v.project_id ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(projects)
    }

    async fn daily_visits(&self, since: i64) -> Result<Vec<DailyCount>> {
        let days = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT strftime('%Y-%m-%d', recorded_at / 1000, 'unixepoch') AS day,
                   COUNT(*) AS visits
            FROM visits
            WHERE recorded_at >= ?
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(days)
    }

    async fn recent_visits(&self, limit: i64) -> Result<Vec<RecentVisit>> {
        let visits = sqlx::query_as::<_, RecentVisit>(
            r#"
            SELECT page, recorded_at
            FROM visits
            ORDER BY recorded_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(visits)
    }

    async fn prune_analytics(&self, before: i64) -> Result<u64> {
        let visits = sqlx::query("DELETE FROM visits WHERE recorded_at < ?")
            .bind(before)
            .execute(self.pool.as_ref())
            .await?;

        let views = sqlx::query("DELETE FROM project_views WHERE recorded_at < ?")
            .bind(before)
            .execute(self.pool.as_ref())
            .await?;

        Ok(visits.rows_affected() + views.rows_affected())
    }
}
