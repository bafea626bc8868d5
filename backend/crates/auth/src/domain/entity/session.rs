//! Session Entity
//!
//! Represents an authenticated caller derived from a verified session token.
//! Never stored: a `Session` exists only after signature, format and expiry
//! checks passed, so holding one means the token was fully valid.

use chrono::Utc;

use crate::domain::value_object::user_id::UserId;

/// Verified session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Authenticated user
    pub user_id: UserId,
    /// Session expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
}

impl Session {
    pub fn new(user_id: UserId, expires_at_ms: i64) -> Self {
        Self {
            user_id,
            expires_at_ms,
        }
    }

    /// Check if session has expired at `now_ms`
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// Check if session has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp_millis())
    }

    /// Get remaining time until expiration
    pub fn remaining_ms(&self) -> i64 {
        let now_ms = Utc::now().timestamp_millis();
        (self.expires_at_ms - now_ms).max(0)
    }

    /// Whether this session belongs to `user_id`
    pub fn is_user(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
