//! API Error Types
//!
//! Handler errors wrap the crate errors; each keeps its own status mapping
//! and logging.

use audit::AuditError;
use auth::AuthError;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(e) => e.into_response(),
            ApiError::Audit(e) => e.into_response(),
        }
    }
}
