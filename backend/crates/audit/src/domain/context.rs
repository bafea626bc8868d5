//! Request Context
//!
//! Per-request attribution data captured by the pipeline right after the
//! session is resolved, and read by the storage layer when it writes an
//! audit entry.

use auth::UserId;
use chrono::{DateTime, Duration, Utc};
use kernel::id::RequestId;

/// Ephemeral per-request metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub user_id: Option<UserId>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(
        request_id: RequestId,
        user_id: Option<UserId>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            request_id,
            user_id,
            ip_address,
            user_agent,
            created_at: Utc::now(),
        }
    }

    /// Override the creation time
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Whether the context outlived `max_age` at `now`
    pub fn is_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at > max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_check() {
        let now = Utc::now();
        let ctx = RequestContext::new(RequestId::new(), None, None, None)
            .with_created_at(now - Duration::seconds(301));

        assert!(ctx.is_older_than(Duration::seconds(300), now));
        assert!(!ctx.is_older_than(Duration::seconds(302), now));
    }
}
