//! Visit and project-view recording
//!
//! Visits are written from a detached task so tracking never delays or fails
//! the request that triggered it. Project views are written inline because
//! the tracking endpoint reports the outcome to its caller.

use axum::http::Method;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::analytics::hasher::IdentifierHasher;
use crate::analytics::models::{ProjectViewRecord, VisitRecord};
use crate::storage::Storage;

/// Path prefixes that are never tracked (admin UI and API namespaces)
pub const RESERVED_PREFIXES: [&str; 2] = ["/admin", "/api"];

/// Well-known static files that are never tracked
pub const STATIC_EXCEPTIONS: [&str; 2] = ["/favicon.ico", "/robots.txt"];

const UNKNOWN_USER_AGENT: &str = "Unknown";

/// Whether a request qualifies for visit tracking.
///
/// Only `GET` requests to non-reserved paths without a file extension count.
/// The named static files are matched explicitly even though the dot rule
/// already excludes them.
pub fn should_track(method: &Method, path: &str) -> bool {
    if *method != Method::GET {
        return false;
    }

    if RESERVED_PREFIXES
        .iter()
        .chain(STATIC_EXCEPTIONS.iter())
        .any(|prefix| path.starts_with(prefix))
    {
        return false;
    }

    !path.contains('.')
}

#[derive(Clone)]
pub struct VisitRecorder {
    storage: Arc<dyn Storage>,
    hasher: Arc<IdentifierHasher>,
}

impl VisitRecorder {
    pub fn new(storage: Arc<dyn Storage>, hasher: Arc<IdentifierHasher>) -> Self {
        Self { storage, hasher }
    }

    /// Record a visit if the request qualifies
    pub fn track(
        &self,
        method: &Method,
        path: &str,
        raw_identifier: &str,
        user_agent: Option<&str>,
    ) -> Option<JoinHandle<()>> {
        if !should_track(method, path) {
            return None;
        }
        Some(self.record_visit(path, raw_identifier, user_agent))
    }

    /// Dispatch a visit write without waiting for it.
    ///
    /// Failures are logged and dropped. The returned handle may be ignored.
    pub fn record_visit(
        &self,
        path: &str,
        raw_identifier: &str,
        user_agent: Option<&str>,
    ) -> JoinHandle<()> {
        let visit = VisitRecord {
            page: path.to_string(),
            identifier_hash: self.hasher.hash(raw_identifier),
            user_agent: user_agent
                .map(str::trim)
                .filter(|ua| !ua.is_empty())
                .unwrap_or(UNKNOWN_USER_AGENT)
                .to_string(),
            recorded_at: Utc::now().timestamp_millis(),
        };

        let storage = Arc::clone(&self.storage);
        tokio::spawn(async move {
            match storage.insert_visit(&visit).await {
                Ok(()) => debug!(page = %visit.page, "visit recorded"),
                Err(e) => error!(page = %visit.page, error = %e, "failed to record visit"),
            }
        })
    }
}

#[derive(Clone)]
pub struct ProjectViewRecorder {
    storage: Arc<dyn Storage>,
    hasher: Arc<IdentifierHasher>,
}

impl ProjectViewRecorder {
    pub fn new(storage: Arc<dyn Storage>, hasher: Arc<IdentifierHasher>) -> Self {
        Self { storage, hasher }
    }

    /// Validate and persist a project view, reporting the outcome
    pub async fn record_view(
        &self,
        project_id: Option<i64>,
        project_title: Option<&str>,
        raw_identifier: &str,
    ) -> AnalyticsResult<ProjectViewRecord> {
        let title = project_title.map(str::trim).filter(|t| !t.is_empty());
        let (Some(project_id), Some(title)) = (project_id, title) else {
            return Err(AnalyticsError::Validation(
                "projectId and projectTitle are required".to_string(),
            ));
        };

        let view = ProjectViewRecord {
            project_id,
            project_title: title.to_string(),
            identifier_hash: self.hasher.hash(raw_identifier),
            recorded_at: Utc::now().timestamp_millis(),
        };

        self.storage.insert_project_view(&view).await?;
        debug!(project_id, "project view recorded");

        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_on_public_page_is_tracked() {
        assert!(should_track(&Method::GET, "/"));
        assert!(should_track(&Method::GET, "/work"));
        assert!(should_track(&Method::GET, "/projects/folio"));
    }

    #[test]
    fn test_non_get_methods_are_not_tracked() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            assert!(!should_track(&method, "/work"), "{method} was tracked");
        }
    }

    #[test]
    fn test_reserved_prefixes_are_not_tracked() {
        assert!(!should_track(&Method::GET, "/admin"));
        assert!(!should_track(&Method::GET, "/admin/analytics"));
        assert!(!should_track(&Method::GET, "/api/projects"));
        assert!(!should_track(&Method::GET, "/apiary"));
    }

    #[test]
    fn test_static_files_are_not_tracked() {
        assert!(!should_track(&Method::GET, "/favicon.ico"));
        assert!(!should_track(&Method::GET, "/robots.txt"));
        assert!(!should_track(&Method::GET, "/assets/index-3f2a.js"));
        assert!(!should_track(&Method::GET, "/hero.glb"));
    }
}
