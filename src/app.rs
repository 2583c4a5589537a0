use axum::Router;
use std::sync::Arc;
use std::time::Duration;

use crate::analytics::{AnalyticsAggregator, IdentifierHasher, ProjectViewRecorder, VisitRecorder};
use crate::api::{create_api_router, AppState};
use crate::auth::AuthService;
use crate::config::Config;
use crate::github::GitHubClient;
use crate::site::{create_app_router, TrackingState};
use crate::storage::Storage;

/// Wire services over `storage` and build the full application router
pub fn build_app(storage: Arc<dyn Storage>, config: &Config) -> anyhow::Result<Router> {
    let hasher = Arc::new(IdentifierHasher::new(config.analytics.hash_secret.clone()));

    let state = Arc::new(AppState {
        storage: Arc::clone(&storage),
        auth: Arc::new(AuthService::new(&config.auth)),
        aggregator: Arc::new(AnalyticsAggregator::new(
            Arc::clone(&storage),
            Duration::from_secs(config.analytics.query_timeout_secs),
        )),
        view_recorder: ProjectViewRecorder::new(Arc::clone(&storage), Arc::clone(&hasher)),
        github: GitHubClient::from_config(&config.github)?,
    });

    let tracking = Arc::new(TrackingState {
        recorder: VisitRecorder::new(storage, hasher),
        analytics_config: config.analytics.clone(),
    });

    Ok(create_app_router(
        create_api_router(state),
        tracking,
        &config.frontend,
    ))
}
