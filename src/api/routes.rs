use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::auth::auth_middleware;

use super::analytics::{get_analytics, track_project_view};
use super::handlers::{
    create_project, github_private_repos, github_public_repos, health_check, import_project,
    list_projects, login, logout, AppState,
};

/// Routes under `/admin` and `/api`
pub fn create_api_router(state: Arc<AppState>) -> Router {
    let require_admin =
        middleware::from_fn_with_state(Arc::clone(&state.auth), auth_middleware);

    let protected_routes = Router::new()
        .route("/admin/analytics", get(get_analytics))
        .route("/admin/track-project-view", post(track_project_view))
        .route("/api/projects/create", post(create_project))
        .route("/api/projects/import", post(import_project))
        .route("/api/projects/fetch", get(github_public_repos))
        .route("/api/projects/private", get(github_private_repos))
        .route_layer(require_admin)
        .with_state(Arc::clone(&state));

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/projects", get(list_projects))
        .route("/admin/login", post(login))
        .route("/admin/logout", post(logout))
        .with_state(state)
        .merge(protected_routes)
}
