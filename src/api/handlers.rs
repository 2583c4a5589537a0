use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use super::error::ApiError;
use crate::analytics::{AnalyticsAggregator, ProjectViewRecorder};
use crate::auth::AuthService;
use crate::github::{GitHubClient, Repository};
use crate::models::{CreateProjectRequest, Project};
use crate::storage::Storage;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub auth: Arc<AuthService>,
    pub aggregator: Arc<AnalyticsAggregator>,
    pub view_recorder: ProjectViewRecorder,
    pub github: GitHubClient,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImportProjectRequest {
    pub repository: Option<String>,
    pub domain: Option<String>,
}

/// Exchange the admin access code for a session cookie
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let code = payload.ok().and_then(|Json(body)| body.code);
    let token = state.auth.login(code.as_deref())?;
    info!("admin login succeeded");

    Ok((
        [(header::SET_COOKIE, state.auth.session_cookie(&token))],
        Json(SuccessResponse::new("Login successful.")),
    ))
}

/// Clear the session cookie
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, state.auth.cleared_cookie())],
        Json(SuccessResponse::new("Logged out.")),
    )
}

/// List all projects, newest first
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Vec<Project>>>, ApiError> {
    match state.storage.list_projects().await {
        Ok(projects) => Ok(Json(DataResponse::new(projects))),
        Err(e) => {
            error!("Failed to list projects: {:#}", e);
            Err(ApiError::internal("Error fetching projects", format!("{e:#}")))
        }
    }
}

/// Create a project from an admin-supplied description
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<Json<DataResponse<Project>>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request("Validation failure"))?;
    let project = request.validate()?;

    match state.storage.create_project(&project).await {
        Ok(project) => {
            info!(project_id = project.id, title = %project.title, "project created");
            Ok(Json(DataResponse {
                success: true,
                message: Some("Project created successfully".to_string()),
                data: project,
            }))
        }
        Err(e) => {
            error!("Failed to create project: {:#}", e);
            Err(ApiError::internal("Error creating project", format!("{e:#}")))
        }
    }
}

/// Public repositories of the configured GitHub user
pub async fn github_public_repos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Vec<Repository>>>, ApiError> {
    let repos = state.github.public_repos().await.map_err(|e| {
        error!("Failed to fetch public repositories: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(DataResponse::new(repos)))
}

/// Repositories visible to the configured GitHub access token
pub async fn github_private_repos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Vec<Repository>>>, ApiError> {
    let repos = state.github.private_repos().await.map_err(|e| {
        error!("Failed to fetch private repositories: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(DataResponse::new(repos)))
}

/// Create a project from a GitHub repository
pub async fn import_project(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImportProjectRequest>, JsonRejection>,
) -> Result<Json<DataResponse<Project>>, ApiError> {
    let request = payload.ok().map(|Json(body)| body);
    let (Some(repository), Some(domain)) = (
        request
            .as_ref()
            .and_then(|r| r.repository.as_deref())
            .map(str::trim)
            .filter(|r| !r.is_empty()),
        request
            .as_ref()
            .and_then(|r| r.domain.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Repository and domain are required."));
    };

    let repo = state.github.repository(repository).await.map_err(|e| {
        error!(repository, "Failed to fetch repository: {}", e);
        ApiError::from(e)
    })?;

    let project = state
        .storage
        .create_project(&repo.to_new_project(domain))
        .await
        .map_err(|e| {
            error!("Failed to store imported project: {:#}", e);
            ApiError::internal("Error creating project", format!("{e:#}"))
        })?;

    info!(project_id = project.id, repository = %repo.full_name, "project imported");
    Ok(Json(DataResponse {
        success: true,
        message: Some("Project imported successfully".to_string()),
        data: project,
    }))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
