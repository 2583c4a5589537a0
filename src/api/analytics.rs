//! Analytics API handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, warn};

use super::error::ApiError;
use super::handlers::{AppState, DataResponse, SuccessResponse};
use crate::analytics::{build_snapshot, AnalyticsError, AnalyticsSnapshot};
use crate::site::ClientIdentifier;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackProjectViewRequest {
    pub project_id: Option<i64>,
    pub project_title: Option<String>,
}

/// Get the analytics snapshot
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<AnalyticsSnapshot>>, ApiError> {
    match state.aggregator.compute_snapshot(Utc::now()).await {
        Ok(raw) => Ok(Json(DataResponse::new(build_snapshot(raw)))),
        Err(e) => {
            error!("Failed to compute analytics snapshot: {:#}", e);
            Err(ApiError::from(e).with_message("Error fetching analytics data"))
        }
    }
}

/// Record a view of a portfolio project
pub async fn track_project_view(
    State(state): State<Arc<AppState>>,
    Extension(ClientIdentifier(identifier)): Extension<ClientIdentifier>,
    payload: Result<Json<TrackProjectViewRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Malformed project view payload: {}", rejection);
            TrackProjectViewRequest::default()
        }
    };

    state
        .view_recorder
        .record_view(
            request.project_id,
            request.project_title.as_deref(),
            &identifier,
        )
        .await
        .map_err(|e| match e {
            AnalyticsError::Validation(_) => ApiError::from(e),
            other => {
                error!("Failed to track project view: {:#}", other);
                ApiError::from(other)
                    .with_message("Error tracking project view")
                    .without_detail()
            }
        })?;

    Ok(Json(SuccessResponse::new("Project view tracked")))
}
