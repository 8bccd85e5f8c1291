//! # Web API Error Types
//!
//! Errors returned by the trigger surface and their HTTP response conversions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error::{SyncError, Upstream};

/// Web API errors with HTTP status code mappings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Authentication failed: {reason}")]
    Unauthorized { reason: String },

    #[error("Upstream {service} failed: {reason}")]
    BadGateway { service: Upstream, reason: String },

    #[error("Internal server error: {reason}")]
    Internal { reason: String },
}

impl ApiError {
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        let message = err.to_string();
        match err {
            SyncError::Unauthorized { reason } => Self::Unauthorized { reason },
            SyncError::UpstreamUnavailable { service, .. }
            | SyncError::UpstreamRejected { service, .. }
            | SyncError::UpstreamMalformed { service, .. } => Self::BadGateway {
                service,
                reason: message,
            },
            SyncError::Configuration { .. } | SyncError::InvalidTransition { .. } => Self::Internal {
                reason: message,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (error_code, message) = match &self {
            ApiError::Unauthorized { reason } => ("UNAUTHORIZED", reason.as_str()),
            ApiError::BadGateway { .. } => ("UPSTREAM_ERROR", "Couldn't verify identity"),
            ApiError::Internal { .. } => ("INTERNAL_ERROR", "Internal server error"),
        };

        let error_response = json!({
            "error": {
                "code": error_code,
                "message": message
            }
        });

        (self.status_code(), Json(error_response)).into_response()
    }
}

/// Result type alias for web API operations
pub type ApiResult<T> = Result<T, ApiError>;
