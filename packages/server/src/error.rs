use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, error::ConnAcquireErr};
use serde::Serialize;

use crate::payment::GatewayError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `INVALID_ID`,
    /// `NOT_FOUND`, `DUPLICATE_REGISTRATION`, `INVALID_TRANSITION`,
    /// `PERSISTENCE_ERROR`, `GATEWAY_ERROR`, `TIMEOUT`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "taskName must not be empty")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// The path identifier is not a well-formed id.
    InvalidId(String),
    NotFound(String),
    DuplicateRegistration(String),
    InvalidTransition(String),
    /// Store unreachable or a write failed. Carries the cause for the log only.
    Persistence(String),
    /// Payment provider failure. Carries the cause for the log only.
    Gateway(String),
    /// A store or gateway call exceeded its time budget.
    Timeout(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::InvalidId(id) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "INVALID_ID",
                    message: format!("'{id}' is not a valid identifier"),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::DuplicateRegistration(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "DUPLICATE_REGISTRATION",
                    message: msg,
                },
            ),
            AppError::InvalidTransition(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "INVALID_TRANSITION",
                    message: msg,
                },
            ),
            AppError::Persistence(detail) => {
                tracing::error!("Persistence error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "PERSISTENCE_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
            AppError::Gateway(detail) => {
                tracing::error!("Payment gateway error: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        code: "GATEWAY_ERROR",
                        message: "Payment provider request failed".into(),
                    },
                )
            }
            AppError::Timeout(detail) => {
                tracing::error!("Timed out: {}", detail);
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    ErrorBody {
                        code: "TIMEOUT",
                        message: "The operation timed out".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => {
                AppError::Timeout("database connection acquire".into())
            }
            other => AppError::Persistence(other.to_string()),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::SessionNotFound(id) => {
                tracing::warn!("Payment session not found: {id}");
                AppError::NotFound(format!("Payment session '{id}' not found"))
            }
            GatewayError::Timeout => AppError::Timeout("payment gateway request".into()),
            other => AppError::Gateway(other.to_string()),
        }
    }
}
