//! Conversions into [`AppError`]
//!
//! Database and JSON failures are classified here once so every crate maps
//! them the same way.

use super::app_error::AppError;
#[cfg(feature = "sqlx")]
use super::kind::ErrorKind;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() {
            AppError::bad_request("Malformed JSON").with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

/// `sqlx::Error` の分類
///
/// 接続枯渇・停止系（PoolTimedOut / PoolClosed / Io / SQLSTATE 53xxx, 57xxx）は
/// 一時的な障害として 503 に寄せます。
#[cfg(feature = "sqlx")]
pub fn sqlx_error_kind(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ErrorKind::ServiceUnavailable
        }
        sqlx::Error::Database(db_err) => {
            let unavailable = db_err
                .code()
                .is_some_and(|code| code.starts_with("53") || code.starts_with("57"));
            if unavailable {
                ErrorKind::ServiceUnavailable
            } else {
                ErrorKind::InternalServerError
            }
        }
        _ => ErrorKind::InternalServerError,
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let kind = sqlx_error_kind(&err);
        let message = match (&err, kind) {
            (_, ErrorKind::NotFound) => "Record not found",
            (sqlx::Error::Io(_), _) => "Database connection error",
            (_, ErrorKind::ServiceUnavailable) => "Database unavailable",
            _ => "Database error",
        };
        AppError::new(kind, message).with_source(err)
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.kind().http_status(), axum::Json(self.body())).into_response()
    }
}
