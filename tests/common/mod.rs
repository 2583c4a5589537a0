#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{body::Body, http::Response};
use folio::analytics::models::{
    DailyCount, PageCount, ProjectCount, ProjectViewRecord, RecentVisit, VisitRecord,
};
use folio::config::*;
use folio::models::{NewProject, Project};
use folio::storage::{SqliteStorage, Storage};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const ACCESS_CODE: &str = "letmein";
pub const JWT_SECRET: &str = "test-jwt-secret";
pub const HASH_SECRET: &str = "test-hash-secret";

/// Helper to create test storage
pub async fn create_test_storage() -> Arc<dyn Storage> {
    let storage = SqliteStorage::new("sqlite::memory:", 1).await.unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

/// Helper to create test config
pub fn create_test_config() -> Config {
    Config {
        database: DatabaseConfig {
            backend: DatabaseBackend::Sqlite,
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            access_code: ACCESS_CODE.to_string(),
            token_ttl_secs: 86400,
            secure_cookie: false,
        },
        analytics: AnalyticsConfig {
            hash_secret: HASH_SECRET.to_string(),
            trusted_proxy_mode: TrustedProxyMode::Standard,
            trusted_proxies: vec![],
            num_trusted_proxies: None,
            query_timeout_secs: 10,
            retention_days: None,
        },
        frontend: FrontendConfig {
            static_dir: None,
            allowed_origin: None,
        },
        github: GitHubConfig {
            api_base_url: GitHubConfig::DEFAULT_API_URL.to_string(),
            username: None,
            access_token: None,
        },
    }
}

pub fn visit(page: &str, hash: &str, recorded_at: i64) -> VisitRecord {
    VisitRecord {
        page: page.to_string(),
        identifier_hash: hash.to_string(),
        user_agent: "test-agent".to_string(),
        recorded_at,
    }
}

pub fn project_view(project_id: i64, title: &str, recorded_at: i64) -> ProjectViewRecord {
    ProjectViewRecord {
        project_id,
        project_title: title.to_string(),
        identifier_hash: "0123456789abcdef".to_string(),
        recorded_at,
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Wait for detached visit writes to land
pub async fn wait_for_visits(storage: &Arc<dyn Storage>, expected: i64) -> i64 {
    let mut count = 0;
    for _ in 0..200 {
        count = storage.count_visits(None).await.unwrap();
        if count >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    count
}

/// Storage whose every operation fails, as if the database were down
pub struct FailingStorage;

fn unavailable<T>() -> Result<T> {
    Err(anyhow!("database unavailable"))
}

#[async_trait]
impl Storage for FailingStorage {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn create_project(&self, _project: &NewProject) -> Result<Project> {
        unavailable()
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        unavailable()
    }

    async fn insert_visit(&self, _visit: &VisitRecord) -> Result<()> {
        unavailable()
    }

    async fn insert_project_view(&self, _view: &ProjectViewRecord) -> Result<()> {
        unavailable()
    }

    async fn count_visits(&self, _since: Option<i64>) -> Result<i64> {
        unavailable()
    }

    async fn count_unique_visitors(&self, _since: i64) -> Result<i64> {
        unavailable()
    }

    async fn top_pages(&self, _limit: i64) -> Result<Vec<PageCount>> {
        unavailable()
    }

    async fn popular_projects(&self, _limit: i64) -> Result<Vec<ProjectCount>> {
        unavailable()
    }

    async fn daily_visits(&self, _since: i64) -> Result<Vec<DailyCount>> {
        unavailable()
    }

    async fn recent_visits(&self, _limit: i64) -> Result<Vec<RecentVisit>> {
        unavailable()
    }

    async fn prune_analytics(&self, _before: i64) -> Result<u64> {
        unavailable()
    }
}
