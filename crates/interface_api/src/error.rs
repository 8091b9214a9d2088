//! API error handling
//!
//! Maps the error taxonomy onto HTTP statuses: validation failures are
//! client-fixable (422), authorization failures are 403 with no state
//! change, illegal lifecycle transitions are precondition failures (412),
//! and storage faults are internal errors safe to retry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_bills::BillError;
use domain_ledger::LedgerError;
use infra_db::RepositoryError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::PreconditionFailed(msg) => (
                StatusCode::PRECONDITION_FAILED,
                "precondition_failed",
                msg.clone(),
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                msg.clone(),
            ),
            ApiError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                msg.clone(),
            ),
            ApiError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg.clone(),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(db) if db.is_not_found() => ApiError::NotFound(db.to_string()),
            RepositoryError::Database(db) if db.is_constraint_violation() => {
                ApiError::Conflict(db.to_string())
            }
            RepositoryError::Database(db) => ApiError::Database(db.to_string()),
            RepositoryError::Bill(bill) => match bill {
                BillError::NotAParty { .. } => ApiError::Forbidden(bill.to_string()),
                BillError::InvalidTransition { .. } => ApiError::PreconditionFailed(bill.to_string()),
                BillError::UnknownStatus(_)
                | BillError::UnknownOutcome(_)
                | BillError::UnknownActionType(_) => ApiError::Internal(bill.to_string()),
                _ => ApiError::Validation(bill.to_string()),
            },
            RepositoryError::Ledger(ledger) => match ledger {
                LedgerError::UnknownTransactionType(_) | LedgerError::Amount(_) => {
                    ApiError::Internal(ledger.to_string())
                }
                _ => ApiError::Validation(ledger.to_string()),
            },
            RepositoryError::Netting(netting) => ApiError::Validation(netting.to_string()),
            RepositoryError::NotAMember { .. } | RepositoryError::NotAnAdmin { .. } => {
                ApiError::Forbidden(err.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}
