//! Guard Error Types
//!
//! Every short-circuit of the request pipeline is a `GuardError`; the
//! response shape (status, JSON body, retry headers) is decided here.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::rate_limit::{RateLimitResult, RateLimitStoreError};
use thiserror::Error;

use crate::application::csrf::CsrfRejection;
use crate::application::rate_limiter::apply_rate_limit_headers;

/// Guard-specific result type alias
pub type GuardResult<T> = Result<T, GuardError>;

/// `Retry-After` sent when the rate limit store is unavailable
pub const UNAVAILABLE_RETRY_AFTER_SECS: u64 = 30;

/// Guard-specific error variants
#[derive(Debug, Error)]
pub enum GuardError {
    /// CSRF validation failed
    #[error("Invalid CSRF token")]
    CsrfRejected(CsrfRejection),

    /// Sliding window is full
    #[error("Too many requests")]
    RateLimited {
        result: RateLimitResult,
        retry_after_secs: u64,
    },

    /// Rate limit store errored or timed out
    #[error("Service temporarily unavailable")]
    RateLimitUnavailable(#[source] RateLimitStoreError),

    /// Protected API route without a session
    #[error("Authentication required")]
    Unauthenticated { path: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GuardError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        self.kind().http_status()
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GuardError::CsrfRejected(_) => ErrorKind::Forbidden,
            GuardError::RateLimited { .. } => ErrorKind::TooManyRequests,
            GuardError::RateLimitUnavailable(_) => ErrorKind::ServiceUnavailable,
            GuardError::Unauthenticated { .. } => ErrorKind::Unauthorized,
            GuardError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            GuardError::Internal(_) => AppError::internal("Internal server error"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            GuardError::CsrfRejected(reason) => {
                tracing::warn!(reason = %reason, "CSRF validation failed");
            }
            GuardError::RateLimited { result, .. } => {
                tracing::warn!(limit = result.limit, "Rate limit exceeded");
            }
            GuardError::RateLimitUnavailable(e) => {
                tracing::error!(error = %e, "Rate limit store unavailable, rejecting request");
            }
            GuardError::Unauthenticated { path } => {
                tracing::warn!(path = %path, "Protected API route without session");
            }
            GuardError::Internal(msg) => {
                tracing::error!(message = %msg, "Guard internal error");
            }
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        self.log();
        let mut response = self.to_app_error().into_response();

        match &self {
            GuardError::RateLimited {
                result,
                retry_after_secs,
            } => {
                apply_rate_limit_headers(response.headers_mut(), result);
                response
                    .headers_mut()
                    .insert(http::header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
            }
            GuardError::RateLimitUnavailable(_) => {
                response.headers_mut().insert(
                    http::header::RETRY_AFTER,
                    HeaderValue::from(UNAVAILABLE_RETRY_AFTER_SECS),
                );
            }
            _ => {}
        }

        response
    }
}

impl From<AppError> for GuardError {
    fn from(err: AppError) -> Self {
        GuardError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GuardError::CsrfRejected(CsrfRejection::MissingCookie).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GuardError::RateLimitUnavailable(RateLimitStoreError::NotConfigured).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            GuardError::Unauthenticated {
                path: "/api/users/me".to_string()
            }
            .status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_rate_limited_response_headers() {
        let response = GuardError::RateLimited {
            result: RateLimitResult {
                allowed: false,
                limit: 5,
                remaining: 0,
                reset_at_ms: 1_700_000_600_000,
            },
            retry_after_secs: 42,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let headers = response.headers();
        assert_eq!(headers["retry-after"], "42");
        assert_eq!(headers["x-ratelimit-limit"], "5");
        assert_eq!(headers["x-ratelimit-remaining"], "0");
        assert_eq!(headers["x-ratelimit-reset"], "1700000600");
    }

    #[test]
    fn test_unavailable_has_fixed_retry_after() {
        let response =
            GuardError::RateLimitUnavailable(RateLimitStoreError::Timeout(std::time::Duration::from_secs(2)))
                .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()["retry-after"], "30");
    }
}
