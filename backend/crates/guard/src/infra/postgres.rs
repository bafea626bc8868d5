//! PostgreSQL Rate Limit Store
//!
//! One row per `(identifier, window_start_ms)` slot. The check reads the
//! previous and current slots and records the hit in a single statement,
//! only when the weighted estimate is still under the limit. The conflict
//! branch re-checks the slot count so a slot never exceeds the limit under
//! concurrent writers. Postgres has no TTL, so expired slots are deleted by
//! `purge_expired`, driven by the window sweeper.

use chrono::Utc;
use platform::rate_limit::{
    RateLimitConfig, RateLimitResult, RateLimitStore, RateLimitStoreError, SlidingWindow,
};
use sqlx::PgPool;

/// PostgreSQL-backed sliding window store
#[derive(Clone)]
pub struct PgRateLimitStore {
    pool: PgPool,
}

impl PgRateLimitStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RateLimitStore for PgRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitStoreError> {
        let now_ms = Utc::now().timestamp_millis();
        let window = SlidingWindow::at(now_ms, config);
        let limit = i32::try_from(config.max_requests).unwrap_or(i32::MAX);

        let (previous, current, recorded) = sqlx::query_as::<_, (i32, i32, bool)>(
            r#"
            WITH prev AS (
                SELECT COALESCE(SUM(request_count), 0)::INT4 AS n
                FROM rate_limit_windows
                WHERE identifier = $1 AND window_start_ms = $3
            ),
            cur AS (
                SELECT COALESCE(SUM(request_count), 0)::INT4 AS n
                FROM rate_limit_windows
                WHERE identifier = $1 AND window_start_ms = $2
            ),
            hit AS (
                INSERT INTO rate_limit_windows (identifier, window_start_ms, request_count, expires_at_ms)
                SELECT $1, $2, 1, $5
                FROM prev, cur
                WHERE FLOOR(prev.n * $6::FLOAT8) + cur.n < $4
                ON CONFLICT (identifier, window_start_ms)
                DO UPDATE SET
                    request_count = rate_limit_windows.request_count + 1,
                    expires_at_ms = EXCLUDED.expires_at_ms
                WHERE rate_limit_windows.request_count < $4
                RETURNING request_count
            )
            SELECT
                prev.n,
                COALESCE((SELECT request_count FROM hit), cur.n)::INT4,
                EXISTS (SELECT 1 FROM hit)
            FROM prev, cur
            "#,
        )
        .bind(key)
        .bind(window.current_start_ms)
        .bind(window.previous_start_ms)
        .bind(limit)
        .bind(window.expires_at_ms())
        .bind(window.previous_weight)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RateLimitStoreError::Backend(Box::new(e)))?;

        let result = window.outcome(
            config,
            previous.max(0) as u32,
            current.max(0) as u32,
            recorded,
        );

        if !result.allowed {
            tracing::debug!(
                identifier = %key,
                limit = config.max_requests,
                "Sliding window full"
            );
        }

        Ok(result)
    }

    async fn purge_expired(&self, now_ms: i64) -> Result<u64, RateLimitStoreError> {
        let deleted = sqlx::query("DELETE FROM rate_limit_windows WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await
            .map_err(|e| RateLimitStoreError::Backend(Box::new(e)))?
            .rows_affected();

        Ok(deleted)
    }
}
