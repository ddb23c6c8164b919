// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Every handler returns it; each variant maps to one HTTP status and a `{ "error": ... }` body.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized (no session or invalid token)
    AuthError(String),

    // 403 Forbidden (wrong role or not the owner)
    Forbidden(String),

    // 403 Forbidden, private inquiry needs its password
    PasswordRequired,

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., duplicate email, order no longer payable)
    Conflict(String),

    // 400 Bad Request, the payment gateway refused the confirmation
    PaymentRejected(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) | AppError::PaymentRejected(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::PasswordRequired => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

/// Implements `IntoResponse` for `AppError`.
/// Internal details are logged and never sent to the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                json!({ "error": "Internal Server Error" })
            }
            AppError::PaymentRejected(detail) => {
                tracing::warn!("Payment confirmation rejected: {}", detail);
                json!({ "error": "Payment confirmation failed" })
            }
            AppError::PasswordRequired => json!({
                "error": "This inquiry is private. Enter its password to view it.",
                "requiresPassword": true,
            }),
            AppError::BadRequest(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => json!({ "error": msg }),
        };

        (status, Json(body)).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// Stored JSON that fails to parse is a server-side fault, not a client one.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
