//! Rate Limiter
//!
//! Bounded-time wrapper around a [`RateLimitStore`]. A store error and a
//! timeout are the same thing to callers: the request is refused.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use platform::rate_limit::{RateLimitConfig, RateLimitResult, RateLimitStore, RateLimitStoreError};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Rate limiter
pub struct RateLimiter<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    store: Arc<S>,
    timeout: Duration,
}

impl<S> Clone for RateLimiter<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            timeout: self.timeout,
        }
    }
}

impl<S> RateLimiter<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Record a hit for `identifier` under `config`
    pub async fn check(
        &self,
        identifier: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitStoreError> {
        match tokio::time::timeout(self.timeout, self.store.check_and_increment(identifier, config))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(RateLimitStoreError::Timeout(self.timeout)),
        }
    }
}

/// Attach `X-RateLimit-*` headers (reset in Unix seconds)
pub fn apply_rate_limit_headers(headers: &mut HeaderMap, result: &RateLimitResult) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(result.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(result.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(result.reset_at_secs()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::{FailingRateLimitStore, MemoryRateLimitStore};

    #[tokio::test]
    async fn test_counts_down_then_denies() {
        let limiter = RateLimiter::new(
            Arc::new(MemoryRateLimitStore::frozen_at(1_000)),
            Duration::from_secs(2),
        );
        let config = RateLimitConfig::new(3, 60);

        let mut remaining = Vec::new();
        for _ in 0..3 {
            let result = limiter.check("general:1.2.3.4", &config).await.unwrap();
            assert!(result.allowed);
            remaining.push(result.remaining);
        }
        assert_eq!(remaining, vec![2, 1, 0]);

        let denied = limiter.check("general:1.2.3.4", &config).await.unwrap();
        assert!(!denied.allowed);

        // Other identifiers are independent
        let other = limiter.check("general:5.6.7.8", &config).await.unwrap();
        assert!(other.allowed);
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let limiter = RateLimiter::new(Arc::new(FailingRateLimitStore::erroring()), Duration::from_secs(2));
        let err = limiter
            .check("general:unknown", &RateLimitConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RateLimitStoreError::Backend(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_store_times_out() {
        let limiter = RateLimiter::new(Arc::new(FailingRateLimitStore::hanging()), Duration::from_secs(2));
        let err = limiter
            .check("general:unknown", &RateLimitConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RateLimitStoreError::Timeout(d) if d == Duration::from_secs(2)));
    }

    #[test]
    fn test_headers() {
        let mut headers = HeaderMap::new();
        apply_rate_limit_headers(
            &mut headers,
            &RateLimitResult {
                allowed: true,
                limit: 10,
                remaining: 7,
                reset_at_ms: 60_000,
            },
        );
        assert_eq!(headers["x-ratelimit-limit"], "10");
        assert_eq!(headers["x-ratelimit-remaining"], "7");
        assert_eq!(headers["x-ratelimit-reset"], "60");
    }
}
