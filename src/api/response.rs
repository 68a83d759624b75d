//! Response types for the time & attendance API.
//!
//! This module defines the error response structures and maps every
//! [`EngineError`] onto an HTTP status and a stable error code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::validation::Finding;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Validation findings, for `VALIDATION_FAILED`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<Finding>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            findings: Vec::new(),
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(code, message)
        }
    }

    /// Creates a request validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// An error response with an explicit status.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("CONFIG_ERROR", message),
                )
            }
            EngineError::InvalidInterval { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_INTERVAL",
                    message,
                    "A time span ends before it starts or falls outside the two-day axis",
                ),
            ),
            EngineError::InvalidTimeCard { date, .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details("INVALID_TIME_CARD", message, date),
            ),
            EngineError::PolicyMisconfigured { policy, .. } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details("POLICY_MISCONFIGURED", message, policy),
            ),
            EngineError::StateTransitionForbidden { entity, .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::with_details("STATE_TRANSITION_FORBIDDEN", message, entity),
            ),
            EngineError::ValidationFailed { findings } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError {
                    findings,
                    ..ApiError::new("VALIDATION_FAILED", message)
                },
            ),
            EngineError::SheetNotEditable { month, .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::with_details("SHEET_NOT_EDITABLE", message, month),
            ),
            EngineError::NotFound { entity, .. } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::with_details("NOT_FOUND", message, entity),
            ),
            EngineError::Storage { .. } => ApiErrorResponse::new(
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::new("STORAGE_ERROR", message),
            ),
        }
    }
}
