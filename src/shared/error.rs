//! Application Error Types
//!
//! Every service error funnels into [`AppError`], which renders as a JSON
//! body `{ "code", "message", "errors"? }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing, or hidden from the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Well-formed request the chat rules refuse.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Request body failed field validation.
    #[error("Invalid fields: {}", summarize(.0))]
    InvalidFields(Vec<FieldError>),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Field-level validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .first()
        .map(|e| format!("{}: {}", e.field, e.message))
        .unwrap_or_else(|| "Validation failed".into())
}

impl AppError {
    fn code(&self) -> u16 {
        match self {
            AppError::Internal(_) | AppError::Database(_) => 10000,
            AppError::NotFound(_) => 10001,
            AppError::BadRequest(_) => 10002,
            AppError::Unauthorized(_) => 10003,
            AppError::Validation(_) | AppError::InvalidFields(_) => 10007,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::InvalidFields(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match self {
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorResponse {
                    code,
                    message: "Internal server error".into(),
                    errors: None,
                }
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                ErrorResponse {
                    code,
                    message: "Internal server error".into(),
                    errors: None,
                }
            }
            AppError::InvalidFields(errors) => ErrorResponse {
                code,
                message: summarize(&errors),
                errors: Some(errors),
            },
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Validation(msg) => ErrorResponse {
                code,
                message: msg,
                errors: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
