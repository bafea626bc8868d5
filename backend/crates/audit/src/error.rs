//! Audit Error Types
//!
//! Audit-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::conversions::sqlx_error_kind;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Audit-specific result type alias
pub type AuditResult<T> = Result<T, AuditError>;

/// Audit-specific error variants
#[derive(Debug, Error)]
pub enum AuditError {
    /// Target does not exist or is already deleted
    #[error("User not found")]
    TargetNotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuditError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        self.kind().http_status()
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuditError::TargetNotFound => ErrorKind::NotFound,
            AuditError::Database(e) => sqlx_error_kind(e),
            AuditError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Database and internal details are not exposed to the client.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuditError::TargetNotFound => AppError::not_found(self.to_string()),
            AuditError::Database(_) if self.kind() == ErrorKind::ServiceUnavailable => {
                AppError::service_unavailable("Database unavailable")
            }
            AuditError::Database(_) | AuditError::Internal(_) => {
                AppError::internal("Internal server error")
            }
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuditError::Database(e) => {
                tracing::error!(error = %e, "Audit database error");
            }
            AuditError::Internal(msg) => {
                tracing::error!(message = %msg, "Audit internal error");
            }
            AuditError::TargetNotFound => {
                tracing::debug!(error = %self, "Audit error");
            }
        }
    }
}

impl IntoResponse for AuditError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuditError {
    fn from(err: AppError) -> Self {
        AuditError::Internal(err.to_string())
    }
}
