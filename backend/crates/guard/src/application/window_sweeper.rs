//! Rate Limit Window Sweeper
//!
//! Periodically deletes expired sliding-window slots from the shared store.
//! The first pass runs right away, which doubles as the startup cleanup.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use platform::rate_limit::RateLimitStore;
use tokio::task::JoinHandle;

/// Spawn the periodic purge on the current runtime
pub fn spawn_window_sweeper<S>(store: Arc<S>, interval: Duration) -> JoinHandle<()>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match store.purge_expired(Utc::now().timestamp_millis()).await {
                Ok(0) => tracing::debug!("Rate limit window sweep found nothing"),
                Ok(deleted) => {
                    tracing::info!(windows_deleted = deleted, "Swept expired rate limit windows");
                }
                Err(e) => tracing::warn!(error = %e, "Rate limit window sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::{FailingRateLimitStore, MemoryRateLimitStore};
    use platform::rate_limit::RateLimitConfig;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_expired_windows() {
        // Slot at the Unix epoch, long expired on the real clock
        let store = Arc::new(MemoryRateLimitStore::frozen_at(1_000));
        store
            .check_and_increment("general:203.0.113.9", &RateLimitConfig::new(10, 60))
            .await
            .unwrap();
        assert_eq!(store.slot_count(), 1);

        let handle = spawn_window_sweeper(store.clone(), Duration::from_secs(300));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.slot_count(), 0);

        store
            .check_and_increment("general:203.0.113.9", &RateLimitConfig::new(10, 60))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(store.slot_count(), 0);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_survives_store_errors() {
        let handle = spawn_window_sweeper(
            Arc::new(FailingRateLimitStore::erroring()),
            Duration::from_secs(60),
        );
        tokio::time::sleep(Duration::from_secs(130)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
