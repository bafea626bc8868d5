//! Runtime Store Selection
//!
//! `RateLimitStore` is not object safe, so the store chosen at startup is
//! carried as an enum.

use platform::rate_limit::{RateLimitConfig, RateLimitResult, RateLimitStore, RateLimitStoreError};

use crate::infra::postgres::PgRateLimitStore;
use crate::infra::stub::DisabledRateLimitStore;

/// Store selected from configuration
#[derive(Clone)]
pub enum RateLimitBackend {
    Postgres(PgRateLimitStore),
    /// Build phase only
    Disabled(DisabledRateLimitStore),
}

impl RateLimitBackend {
    pub fn name(&self) -> &'static str {
        match self {
            RateLimitBackend::Postgres(_) => "postgres",
            RateLimitBackend::Disabled(_) => "disabled",
        }
    }
}

impl RateLimitStore for RateLimitBackend {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitStoreError> {
        match self {
            RateLimitBackend::Postgres(store) => store.check_and_increment(key, config).await,
            RateLimitBackend::Disabled(store) => store.check_and_increment(key, config).await,
        }
    }

    async fn purge_expired(&self, now_ms: i64) -> Result<u64, RateLimitStoreError> {
        match self {
            RateLimitBackend::Postgres(store) => store.purge_expired(now_ms).await,
            RateLimitBackend::Disabled(store) => store.purge_expired(now_ms).await,
        }
    }
}
