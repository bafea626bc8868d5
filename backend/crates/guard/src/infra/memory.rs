//! In-memory Rate Limit Stores
//!
//! Test doubles: a single-process sliding window (optionally on a frozen
//! clock) and stores that fail or never answer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use platform::rate_limit::{
    RateLimitConfig, RateLimitResult, RateLimitStore, RateLimitStoreError, SlidingWindow,
};

#[derive(Debug, Clone, Copy)]
struct Slot {
    count: u32,
    expires_at_ms: i64,
}

/// In-memory sliding window store
#[derive(Debug, Clone, Default)]
pub struct MemoryRateLimitStore {
    slots: Arc<Mutex<HashMap<(String, i64), Slot>>>,
    frozen_now_ms: Option<i64>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose clock always reads `now_ms`
    pub fn frozen_at(now_ms: i64) -> Self {
        Self {
            frozen_now_ms: Some(now_ms),
            ..Self::default()
        }
    }

    /// Number of stored slots
    pub fn slot_count(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    fn now_ms(&self) -> i64 {
        self.frozen_now_ms
            .unwrap_or_else(|| Utc::now().timestamp_millis())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<(String, i64), Slot>>, RateLimitStoreError> {
        self.slots
            .lock()
            .map_err(|_| RateLimitStoreError::Backend("memory store lock poisoned".into()))
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitStoreError> {
        let window = SlidingWindow::at(self.now_ms(), config);
        let mut slots = self.lock()?;

        let previous = slots
            .get(&(key.to_string(), window.previous_start_ms))
            .map_or(0, |slot| slot.count);
        let current = slots
            .entry((key.to_string(), window.current_start_ms))
            .or_insert(Slot {
                count: 0,
                expires_at_ms: window.expires_at_ms(),
            });

        let recorded = window.has_room(previous, current.count, config.max_requests);
        if recorded {
            current.count += 1;
            current.expires_at_ms = window.expires_at_ms();
        }

        Ok(window.outcome(config, previous, current.count, recorded))
    }

    async fn purge_expired(&self, now_ms: i64) -> Result<u64, RateLimitStoreError> {
        let mut slots = self.lock()?;
        let before = slots.len();
        slots.retain(|_, slot| slot.expires_at_ms >= now_ms);
        Ok((before - slots.len()) as u64)
    }
}

#[derive(Debug, Clone, Copy)]
enum FailureMode {
    Error,
    Hang,
}

/// Store that never produces a result
#[derive(Debug, Clone, Copy)]
pub struct FailingRateLimitStore {
    mode: FailureMode,
}

impl FailingRateLimitStore {
    /// Every call returns a backend error
    pub fn erroring() -> Self {
        Self {
            mode: FailureMode::Error,
        }
    }

    /// Every call waits forever (exercises the timeout)
    pub fn hanging() -> Self {
        Self {
            mode: FailureMode::Hang,
        }
    }
}

impl RateLimitStore for FailingRateLimitStore {
    async fn check_and_increment(
        &self,
        _key: &str,
        _config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitStoreError> {
        match self.mode {
            FailureMode::Error => Err(RateLimitStoreError::Backend(
                "connection refused".into(),
            )),
            FailureMode::Hang => std::future::pending().await,
        }
    }

    async fn purge_expired(&self, _now_ms: i64) -> Result<u64, RateLimitStoreError> {
        match self.mode {
            FailureMode::Error => Err(RateLimitStoreError::Backend(
                "connection refused".into(),
            )),
            FailureMode::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_previous_slot_carries_over() {
        let config = RateLimitConfig::new(10, 60);
        // Fill the slot [0, 60s)
        let early = MemoryRateLimitStore::frozen_at(59_000);
        for _ in 0..10 {
            early.check_and_increment("k", &config).await.unwrap();
        }

        // Halfway through the next slot: 5 carried + 0 current
        let later = MemoryRateLimitStore {
            slots: early.slots.clone(),
            frozen_now_ms: Some(90_000),
        };
        let result = later.check_and_increment("k", &config).await.unwrap();
        assert!(result.allowed);
        assert_eq!(result.remaining, 4);
    }

    #[tokio::test]
    async fn test_count_never_exceeds_limit() {
        let store = MemoryRateLimitStore::frozen_at(1);
        let config = RateLimitConfig::new(2, 60);
        for _ in 0..5 {
            store.check_and_increment("k", &config).await.unwrap();
        }
        let slots = store.slots.lock().unwrap();
        assert_eq!(slots.get(&("k".to_string(), 0)).map(|slot| slot.count), Some(2));
    }

    #[tokio::test]
    async fn test_purge_drops_only_expired_slots() {
        let config = RateLimitConfig::new(5, 60);
        let store = MemoryRateLimitStore::frozen_at(10_000);
        store.check_and_increment("old", &config).await.unwrap();

        // Slot [0, 60s) expires at 120s
        assert_eq!(store.purge_expired(119_999).await.unwrap(), 0);
        assert_eq!(store.slot_count(), 1);
        assert_eq!(store.purge_expired(120_001).await.unwrap(), 1);
        assert_eq!(store.slot_count(), 0);
    }
}
