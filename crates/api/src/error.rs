use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use homestock_core::error::CoreError;
use homestock_notify::NotifyError;

use crate::engine::EngineError;

/// Error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain failures and adds the transport-level
/// variants the handlers produce themselves. The [`IntoResponse`] impl
/// renders every variant as `{"error": ..., "code": ...}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `homestock_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The notifier refused or failed to deliver a batch.
    #[error("Notification dispatch failed: {0}")]
    Dispatch(#[from] NotifyError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Database(e) => AppError::Database(e),
            EngineError::Dispatch(e) => AppError::Dispatch(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => classify_sqlx_error(&err),
            AppError::Dispatch(err) => {
                // Transport details (hosts, credentials) stay in the log.
                tracing::error!(error = %err, "Notification dispatch failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "DISPATCH_FAILED",
                    "Notification dispatch failed".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Status, code, and client message for each [`CoreError`] variant.
fn core_parts(err: CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// The sanitized 500 triple. Details must already have been logged.
fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map a sqlx error onto the HTTP surface.
///
/// `RowNotFound` is a plain 404. Postgres constraint violations are
/// recognized by constraint name prefix: `uq_` duplicates become 409,
/// `fk_` references to missing rows become 404. Everything else is
/// logged and sanitized to a 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if matches!(err, sqlx::Error::RowNotFound) {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        // Postgres codes: 23505 unique_violation, 23503 foreign_key_violation.
        match db_err.code().as_deref() {
            Some("23505") if constraint.starts_with("uq_") => {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
            Some("23503") if constraint.starts_with("fk_") => {
                return (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Referenced row does not exist: {constraint}"),
                );
            }
            _ => {}
        }
    }

    tracing::error!(error = %err, "Database error");
    internal()
}
