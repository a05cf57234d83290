//! Uniform response envelope and error mapping shared by every service.
//!
//! Successful handlers return [`ApiResponse`], failures return [`ApiError`].
//! [`ApiError::status`] is the one place where an error kind becomes an HTTP
//! status code.

mod extract;

pub use extract::{ApiJson, ApiQuery, non_blank, parse_id, provided};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use datastore::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Success envelope: `{statusCode, data, message, success}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }

    /// 200 envelope
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    /// 201 envelope
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Error kinds reported to clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    /// The actor may not touch the resource
    #[error("{0}")]
    Forbidden(String),

    /// An id did not resolve to a record
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The media host failed
    #[error("{0}")]
    Upstream(String),

    /// Anything else; details are logged, not returned
    #[error("{0}")]
    Unexpected(String),
}

/// Failure envelope: `{statusCode, message, error, success}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub error: String,
    pub success: bool,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error kind
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "ValidationError",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::NotFound(_) => "NotFoundError",
            ApiError::Conflict(_) => "ConflictError",
            ApiError::Upstream(_) => "UpstreamError",
            ApiError::Unexpected(_) => "UnexpectedError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Unexpected(detail) => {
                tracing::error!(error = %detail, "Unexpected failure");
                "Internal server error".to_string()
            }
            ApiError::Upstream(detail) => {
                tracing::warn!(error = %detail, "Media host failure");
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            status_code: status.as_u16(),
            message,
            error: self.code().to_string(),
            success: false,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(message) => ApiError::NotFound(message),
            StoreError::Conflict(message) => ApiError::Conflict(message),
            StoreError::Forbidden(message) => ApiError::Forbidden(message),
            StoreError::Invalid(message) => ApiError::Validation(message),
            StoreError::Unavailable(_) => ApiError::Unexpected(error.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
