//! Rate Limiting Infrastructure
//!
//! Store abstraction plus the sliding-window arithmetic shared by every
//! backend. Counters live in the backing store only.
//!
//! The window is approximated with two fixed slots: the estimate at time `t`
//! is `floor(previous * (1 - elapsed / window)) + current`. A hit is recorded
//! only while the estimate is below the limit, so a slot never counts more
//! than `max_requests`.

use std::time::Duration;

/// Rate limit configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Unix seconds at which the current slot ends
    pub fn reset_at_secs(&self) -> i64 {
        (self.reset_at_ms + 999).div_euclid(1000)
    }

    /// Whole seconds until reset, never below one
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let remaining_ms = (self.reset_at_ms - now_ms).max(0);
        ((remaining_ms + 999) / 1000).max(1) as u64
    }
}

/// Error raised by a rate limit backend
///
/// Every variant is treated as "store unavailable" by callers: the request
/// is rejected, never let through.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitStoreError {
    #[error("Rate limit store is not configured")]
    NotConfigured,

    #[error("Rate limit store timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rate limit store error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Record a hit for `key` if the sliding window still has room
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitStoreError>;

    /// Drop slots whose expiry is before `now_ms`, returning how many went
    async fn purge_expired(&self, now_ms: i64) -> Result<u64, RateLimitStoreError>;
}

/// Position of `now` inside the two-slot sliding window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlidingWindow {
    /// Start of the slot containing `now` (Unix ms)
    pub current_start_ms: i64,
    /// Start of the preceding slot (Unix ms)
    pub previous_start_ms: i64,
    /// Slot length in ms
    pub window_ms: i64,
    /// Weight of the preceding slot's count, in `[0, 1]`
    pub previous_weight: f64,
}

impl SlidingWindow {
    /// Locate `now_ms` for a given configuration
    pub fn at(now_ms: i64, config: &RateLimitConfig) -> Self {
        let window_ms = config.window_ms().max(1);
        let current_start_ms = now_ms.div_euclid(window_ms) * window_ms;
        let elapsed = (now_ms - current_start_ms) as f64 / window_ms as f64;

        Self {
            current_start_ms,
            previous_start_ms: current_start_ms - window_ms,
            window_ms,
            previous_weight: (1.0 - elapsed).clamp(0.0, 1.0),
        }
    }

    /// Weighted request count across both slots
    pub fn estimate(&self, previous: u32, current: u32) -> u32 {
        let carried = (previous as f64 * self.previous_weight).floor() as u32;
        carried.saturating_add(current)
    }

    /// Whether one more hit fits under `limit`
    pub fn has_room(&self, previous: u32, current: u32, limit: u32) -> bool {
        self.estimate(previous, current) < limit
    }

    /// End of the current slot (Unix ms)
    pub fn reset_at_ms(&self) -> i64 {
        self.current_start_ms + self.window_ms
    }

    /// When the store should expire the current slot's row/key
    pub fn expires_at_ms(&self) -> i64 {
        self.current_start_ms + 2 * self.window_ms
    }

    /// Build the result after the store decided
    ///
    /// `current` is the slot count after the (possibly skipped) increment.
    pub fn outcome(
        &self,
        config: &RateLimitConfig,
        previous: u32,
        current: u32,
        recorded: bool,
    ) -> RateLimitResult {
        let used = self.estimate(previous, current);
        RateLimitResult {
            allowed: recorded,
            limit: config.max_requests,
            remaining: config.max_requests.saturating_sub(used),
            reset_at_ms: self.reset_at_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_position() {
        let config = RateLimitConfig::new(5, 600);
        let window = SlidingWindow::at(600_000 * 3 + 150_000, &config);

        assert_eq!(window.current_start_ms, 1_800_000);
        assert_eq!(window.previous_start_ms, 1_200_000);
        assert_eq!(window.reset_at_ms(), 2_400_000);
        assert!((window.previous_weight - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_carries_weighted_previous() {
        let config = RateLimitConfig::new(10, 60);
        // Halfway through the slot
        let window = SlidingWindow::at(90_000, &config);

        assert_eq!(window.estimate(10, 0), 5);
        assert_eq!(window.estimate(9, 2), 6);
        assert!(window.has_room(9, 5, 10));
        assert!(!window.has_room(10, 5, 10));
    }

    #[test]
    fn test_outcome_remaining_counts_down() {
        let config = RateLimitConfig::new(5, 600);
        let window = SlidingWindow::at(1, &config);

        let remaining: Vec<u32> = (1..=5)
            .map(|n| window.outcome(&config, 0, n, true).remaining)
            .collect();
        assert_eq!(remaining, vec![4, 3, 2, 1, 0]);

        let denied = window.outcome(&config, 0, 5, false);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
    }

    #[test]
    fn test_retry_after_rounds_up_and_floors_at_one() {
        let result = RateLimitResult {
            allowed: false,
            limit: 5,
            remaining: 0,
            reset_at_ms: 10_500,
        };
        assert_eq!(result.retry_after_secs(9_000), 2);
        assert_eq!(result.retry_after_secs(10_500), 1);
        assert_eq!(result.retry_after_secs(20_000), 1);
        assert_eq!(result.reset_at_secs(), 11);
    }
}
