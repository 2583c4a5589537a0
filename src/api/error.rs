use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::analytics::AnalyticsError;
use crate::auth::AuthError;
use crate::github::GitHubError;
use crate::models::ProjectValidationError;

/// JSON body returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>, error: impl ToString) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            error: Some(error.to_string()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Drop the underlying error text from the response body
    pub fn without_detail(mut self) -> Self {
        self.error = None;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                success: false,
                message: self.message,
                error: self.error,
            }),
        )
            .into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCode => Self::bad_request(err.to_string()),
            AuthError::InvalidCode | AuthError::MissingToken | AuthError::InvalidToken(_) => {
                Self::new(StatusCode::UNAUTHORIZED, err.to_string())
            }
            AuthError::Signing(ref source) => Self::internal(err.to_string(), source),
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Validation(message) => Self::bad_request(message),
            other => Self::internal("Analytics request failed", other),
        }
    }
}

impl From<ProjectValidationError> for ApiError {
    fn from(err: ProjectValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<GitHubError> for ApiError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::NotConfigured(_) => Self::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
            GitHubError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            GitHubError::Upstream(source) => Self {
                status: StatusCode::BAD_GATEWAY,
                message: "Error fetching repositories".to_string(),
                error: Some(format!("{source:#}")),
            },
        }
    }
}
