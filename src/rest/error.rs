//! API error types and responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::GuideError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found
    NotFound(String),
    /// Bad request
    BadRequest(String),
    /// External generator failed
    Upstream(String),
    /// External generator not configured
    NotConfigured(String),
    /// Internal server error
    InternalError(String),
}

/// Error response body
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "generation_failed", msg),
            ApiError::NotConfigured(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "not_configured", msg)
            }
            ApiError::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<GuideError> for ApiError {
    fn from(err: GuideError) -> Self {
        match err {
            GuideError::EmptyInput | GuideError::UnsupportedInput(_) => {
                ApiError::BadRequest(err.to_string())
            }
            GuideError::OutOfRange { .. } | GuideError::NoCurrentStep => {
                ApiError::NotFound(err.to_string())
            }
            GuideError::GeneratorUnavailable { .. } => ApiError::NotConfigured(err.to_string()),
            GuideError::GenerationFailed { .. } | GuideError::Cancelled => {
                ApiError::Upstream(err.to_string())
            }
        }
    }
}
