//! In-process Audit Context Store
//!
//! `DashMap`-backed implementation of [`AuditContextStore`]. Request ids are
//! random, so contention is limited to the map's own shard locks.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use kernel::id::RequestId;

use crate::domain::context::RequestContext;
use crate::domain::context_store::{AuditContextStore, ContextStoreError};

/// Concurrent context map shared by every request task
#[derive(Debug, Clone, Default)]
pub struct DashMapContextStore {
    inner: Arc<DashMap<RequestId, RequestContext>>,
}

impl DashMapContextStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditContextStore for DashMapContextStore {
    fn set(&self, context: RequestContext) -> Result<(), ContextStoreError> {
        match self.inner.entry(context.request_id) {
            Entry::Occupied(_) => Err(ContextStoreError::Duplicate(context.request_id)),
            Entry::Vacant(slot) => {
                slot.insert(context);
                Ok(())
            }
        }
    }

    fn get(&self, request_id: &RequestId) -> Option<RequestContext> {
        self.inner.get(request_id).map(|r| r.value().clone())
    }

    fn clear(&self, request_id: &RequestId) -> bool {
        self.inner.remove(request_id).is_some()
    }

    fn sweep(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, ctx| !ctx.is_older_than(max_age, now));
        before.saturating_sub(self.inner.len())
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::UserId;

    fn context() -> RequestContext {
        RequestContext::new(
            RequestId::new(),
            Some(UserId::new("abc").unwrap()),
            Some("127.0.0.1".to_string()),
            None,
        )
    }

    #[test]
    fn test_set_get_clear() {
        let store = DashMapContextStore::new();
        let ctx = context();
        let id = ctx.request_id;

        store.set(ctx.clone()).unwrap();
        assert_eq!(store.get(&id), Some(ctx));
        assert!(store.clear(&id));
        assert!(!store.clear(&id));
        assert!(store.get(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicate_set_is_rejected() {
        let store = DashMapContextStore::new();
        let ctx = context();
        let id = ctx.request_id;

        store.set(ctx.clone()).unwrap();
        assert_eq!(store.set(ctx).unwrap_err(), ContextStoreError::Duplicate(id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_stale_entries() {
        let store = DashMapContextStore::new();
        let now = Utc::now();

        let stale = context().with_created_at(now - Duration::seconds(600));
        let fresh = context().with_created_at(now - Duration::seconds(10));
        let fresh_id = fresh.request_id;
        store.set(stale).unwrap();
        store.set(fresh).unwrap();

        assert_eq!(store.sweep(Duration::seconds(300), now), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(&fresh_id).is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let store = DashMapContextStore::new();
        let other = store.clone();
        let ctx = context();
        let id = ctx.request_id;

        store.set(ctx).unwrap();
        assert!(other.get(&id).is_some());
    }
}
