//! Audit Context Store Contract
//!
//! Injectable, synchronous map keyed by request id. Implementations must be
//! safe to share across request tasks.

use chrono::{DateTime, Duration, Utc};
use kernel::id::RequestId;

use crate::domain::context::RequestContext;

/// Context store error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextStoreError {
    #[error("Request context already registered for {0}")]
    Duplicate(RequestId),
}

/// Per-request audit context storage
pub trait AuditContextStore: Send + Sync {
    /// Register the context for its request id; a second `set` for the same id fails
    fn set(&self, context: RequestContext) -> Result<(), ContextStoreError>;

    fn get(&self, request_id: &RequestId) -> Option<RequestContext>;

    /// Remove the context; returns whether an entry existed
    fn clear(&self, request_id: &RequestId) -> bool;

    /// Remove every entry older than `max_age` at `now`; returns the count removed
    fn sweep(&self, max_age: Duration, now: DateTime<Utc>) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
