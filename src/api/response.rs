//! Response types for the workforce API.
//!
//! This module defines the error body returned on every failure, the
//! mapping from [`EngineError`] to HTTP status codes, and response views
//! that add derived fields to stored records.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ErrorKind};
use crate::models::{LeaveBalance, Shift};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
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
    /// A 400 response with the given body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let (status, code) = match (&error, error.kind()) {
            (EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. }, _) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            (_, ErrorKind::InvalidInput) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (_, ErrorKind::NotFound) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            (_, ErrorKind::Forbidden) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            (_, ErrorKind::Conflict) => (StatusCode::CONFLICT, "CONFLICT"),
            (_, ErrorKind::Internal) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let error = match error {
            EngineError::InvalidInput { message }
            | EngineError::Forbidden { message }
            | EngineError::Conflict { message } => ApiError::new(code, message),
            EngineError::NotFound { resource } => {
                ApiError::new(code, format!("{resource} not found"))
            }
            other => ApiError::with_details(code, "Internal error", other.to_string()),
        };
        ApiErrorResponse { status, error }
    }
}

/// A shift as returned by the API, with its worked hours once closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftView {
    /// The stored shift and its breaks.
    #[serde(flatten)]
    pub shift: Shift,
    /// Hours worked net of breaks; `None` while open.
    pub worked_hours: Option<Decimal>,
}

impl From<Shift> for ShiftView {
    fn from(shift: Shift) -> Self {
        let worked_hours = shift.worked_hours();
        Self {
            shift,
            worked_hours,
        }
    }
}

/// A balance as returned by the API, with the days still available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceView {
    /// The stored balance.
    #[serde(flatten)]
    pub balance: LeaveBalance,
    /// `total - used`.
    pub remaining: Decimal,
}

impl From<LeaveBalance> for BalanceView {
    fn from(balance: LeaveBalance) -> Self {
        let remaining = balance.remaining();
        Self { balance, remaining }
    }
}

/// Body of `DELETE /api/attendance/employee/:employee_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedCount {
    /// How many records were removed.
    pub deleted: usize,
}
