use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    response::Html,
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::warn;

use crate::config::FrontendConfig;

use super::middleware::{track_visit, TrackingState};

const PLACEHOLDER_PAGE: &str = "<!doctype html>\
<html lang=\"en\"><head><meta charset=\"utf-8\"><title>Portfolio</title></head>\
<body><main><h1>Portfolio</h1><p>The site is being built.</p></main></body></html>";

async fn placeholder() -> Html<&'static str> {
    Html(PLACEHOLDER_PAGE)
}

/// Combine the API router with the landing page and wrap everything in visit tracking
pub fn create_app_router(
    api_router: Router,
    tracking: Arc<TrackingState>,
    frontend: &FrontendConfig,
) -> Router {
    let router = match frontend.static_dir.as_deref() {
        Some(dir) => {
            // Client-side routes fall back to the SPA entry point
            let index = PathBuf::from(dir).join("index.html");
            api_router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => api_router.fallback(placeholder),
    };

    let router = match frontend.allowed_origin.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => router.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
                .allow_credentials(true),
        ),
        Some(Err(e)) => {
            warn!("Ignoring invalid CORS_ALLOWED_ORIGIN: {}", e);
            router
        }
        None => router,
    };

    router.layer(middleware::from_fn_with_state(tracking, track_visit))
}
