pub mod token;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::debug;

use crate::api::error::ApiError;
use crate::config::AuthConfig;

pub use token::{Claims, TokenCodec, ADMIN_ROLE};

/// Name of the cookie carrying the admin session token
pub const SESSION_COOKIE: &str = "Token";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Login code is required")]
    MissingCode,
    #[error("Invalid access code")]
    InvalidCode,
    #[error("Session expired, please login again.")]
    MissingToken,
    #[error("Invalid or expired session.")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
    #[error("Error logging in")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

pub struct AuthService {
    access_code: String,
    codec: TokenCodec,
    token_ttl_secs: u64,
    secure_cookie: bool,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_code: config.access_code.clone(),
            codec: TokenCodec::new(&config.jwt_secret),
            token_ttl_secs: config.token_ttl_secs,
            secure_cookie: config.secure_cookie,
        }
    }

    /// Exchange the shared access code for a signed admin token
    pub fn login(&self, code: Option<&str>) -> Result<String, AuthError> {
        let code = code.filter(|c| !c.is_empty()).ok_or(AuthError::MissingCode)?;

        if !bool::from(code.as_bytes().ct_eq(self.access_code.as_bytes())) {
            return Err(AuthError::InvalidCode);
        }

        self.issue_token()
    }

    pub fn issue_token(&self) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.codec
            .issue(ADMIN_ROLE, now, self.token_ttl_secs)
            .map_err(AuthError::Signing)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.codec.verify(token).map_err(AuthError::InvalidToken)
    }

    /// `Set-Cookie` value storing a session token
    pub fn session_cookie(&self, token: &str) -> String {
        self.cookie(token, self.token_ttl_secs)
    }

    /// `Set-Cookie` value that clears the session
    pub fn cleared_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: u64) -> String {
        let secure = if self.secure_cookie { "; Secure" } else { "" };
        format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age}{secure}")
    }
}

/// Read the session token from the request cookies
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let verified = session_token(request.headers())
        .ok_or(AuthError::MissingToken)
        .and_then(|token| auth_service.verify_token(token));

    match verified {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            debug!(error = ?e, "rejected admin request");
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn service() -> AuthService {
        AuthService::new(&AuthConfig {
            jwt_secret: "jwt-secret".to_string(),
            access_code: "open-sesame".to_string(),
            token_ttl_secs: 86400,
            secure_cookie: false,
        })
    }

    #[test]
    fn test_login_with_valid_code() {
        let auth = service();
        let token = auth.login(Some("open-sesame")).unwrap();
        assert_eq!(auth.verify_token(&token).unwrap().role, ADMIN_ROLE);
    }

    #[test]
    fn test_login_rejects_missing_and_wrong_codes() {
        let auth = service();
        assert!(matches!(auth.login(None), Err(AuthError::MissingCode)));
        assert!(matches!(auth.login(Some("")), Err(AuthError::MissingCode)));
        assert!(matches!(auth.login(Some("open")), Err(AuthError::InvalidCode)));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = service().session_cookie("abc");
        assert_eq!(
            cookie,
            "Token=abc; Path=/; HttpOnly; SameSite=Strict; Max-Age=86400"
        );
    }

    #[test]
    fn test_session_token_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; Token=abc.def.ghi; other=1"),
        );
        assert_eq!(session_token(&headers), Some("abc.def.ghi"));

        let mut empty = HeaderMap::new();
        empty.insert(header::COOKIE, HeaderValue::from_static("Token="));
        assert_eq!(session_token(&empty), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }
}
