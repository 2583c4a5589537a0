use axum::{
    extract::{ConnectInfo, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::analytics::hasher::LOOPBACK_SENTINEL;
use crate::analytics::{extract_client_ip, VisitRecorder};
use crate::config::AnalyticsConfig;

/// Raw client identifier resolved for the current request.
///
/// Inserted by [`track_visit`] so handlers hash the same address that visit
/// tracking saw. Never stored as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentifier(pub String);

pub struct TrackingState {
    pub recorder: VisitRecorder,
    pub analytics_config: AnalyticsConfig,
}

/// Resolve the client identifier and record qualifying visits.
///
/// The visit write is detached; the request continues immediately.
pub async fn track_visit(
    State(state): State<Arc<TrackingState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let socket_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let identifier = extract_client_ip(request.headers(), socket_ip, &state.analytics_config)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| LOOPBACK_SENTINEL.to_string());

    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok());

    state
        .recorder
        .track(request.method(), request.uri().path(), &identifier, user_agent);

    request
        .extensions_mut()
        .insert(ClientIdentifier(identifier));
    next.run(request).await
}
