//! Build-phase Store
//!
//! Substituted for the real store only while the process runs in the
//! recognized build phase. Every call fails, so guarded routes answer 503.

use platform::rate_limit::{RateLimitConfig, RateLimitResult, RateLimitStore, RateLimitStoreError};

/// Non-functional rate limit store
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRateLimitStore;

impl RateLimitStore for DisabledRateLimitStore {
    async fn check_and_increment(
        &self,
        _key: &str,
        _config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitStoreError> {
        Err(RateLimitStoreError::NotConfigured)
    }

    async fn purge_expired(&self, _now_ms: i64) -> Result<u64, RateLimitStoreError> {
        Ok(0)
    }
}
