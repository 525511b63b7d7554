//! HTTP error mapping.
//!
//! Every failure leaving a handler is an [`ApiError`] and becomes a JSON
//! body `{"error": ..., "code": ...}` with a matching status. Lease
//! conflicts get their own codes so clients can refresh instead of alarm.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use loaner_core::error::LoanerError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] LoanerError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not authenticated")]
    Unauthenticated,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl ApiError {
    /// Status and stable machine-readable code.
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            ApiError::Domain(err) => (domain_status(err), err.code()),
        }
    }
}

fn domain_status(err: &LoanerError) -> StatusCode {
    if err.is_lease_conflict() {
        return StatusCode::CONFLICT;
    }
    match err {
        LoanerError::Validation { .. } | LoanerError::AlreadyExists { .. } => {
            StatusCode::BAD_REQUEST
        }
        LoanerError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
        LoanerError::AuthorizationDenied { .. } => StatusCode::FORBIDDEN,
        LoanerError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

pub type Result<T> = std::result::Result<T, ApiError>;
