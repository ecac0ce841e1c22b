// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::{AccessError, AuthError};
use crate::models::ModelError;
use crate::render::RenderError;
use crate::repository::RepositoryError;
use crate::validation::ValidationError;

/// HTTP API error. Every failure a handler or the gate can produce is
/// converted into one of these by the `From` impls below, which are the
/// single error-kind to status-code table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::InternalServerError(_) => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Error envelope: `{"error": "<message>"}`
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!("Bad request: {}", message);
        ApiError::BadRequest(message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// `<field> is required`, for missing path or body fields.
    pub fn required(field: &str) -> Self {
        ApiError::bad_request(format!("{} is required", field))
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        tracing::warn!("Invalid account request: {}", err);
        ApiError::internal_server_error(err.to_string())
    }
}

// Validation failures are client errors but have always been reported as 500.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        tracing::warn!("Account request failed validation: {}", err);
        ApiError::internal_server_error(err.to_string())
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        tracing::error!("Error rendering configuration: {}", err);
        ApiError::internal_server_error(err.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        tracing::error!("Repository error: {}", err);
        ApiError::internal_server_error(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err.status_code() {
            401 => {
                tracing::warn!("Authentication failed: {}", err);
                ApiError::unauthorized(err.to_string())
            }
            _ => {
                tracing::error!("Authentication backend error: {}", err);
                ApiError::internal_server_error(err.to_string())
            }
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Authentication(e) => e.into(),
            AccessError::Forbidden { .. } => ApiError::forbidden(err.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
