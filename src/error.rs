//! Application error type and its HTTP representation.
//!
//! Handler errors are rendered as
//! `{"error": {"code": ..., "message": ..., "details": ...}}`. Rejections
//! raised by axum extractors before a handler runs keep axum's plain-text body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::timestamp;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("start {start} is after end {end}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("{message}")]
    WriteFailure { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn write_failure(message: impl Into<String>, details: Value) -> Self {
        Self::WriteFailure {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }
    pub fn invalid_range(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self::InvalidRange { start, end }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::InvalidRange { start, end } => (
                StatusCode::BAD_REQUEST,
                "invalid_range",
                "Start must not be after end".to_string(),
                json!({
                    "start": timestamp::format(&start),
                    "end": timestamp::format(&end),
                }),
            ),
            AppError::WriteFailure { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "write_failure",
                message,
                details,
            ),
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", e);
        AppError::internal("Database error", json!({}))
    }
}
