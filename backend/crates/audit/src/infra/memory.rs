//! In-memory Repository
//!
//! Test double for [`SoftDeleteRepository`]: a set of live user ids plus the
//! audit entries written so far.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use auth::UserId;

use crate::domain::audit_log::AuditLogEntry;
use crate::domain::repository::SoftDeleteRepository;
use crate::error::{AuditError, AuditResult};

#[derive(Debug, Default)]
struct State {
    live_users: HashSet<String>,
    entries: Vec<AuditLogEntry>,
}

/// In-memory soft delete repository
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLogRepository {
    state: Arc<Mutex<State>>,
}

impl MemoryAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed live users
    pub fn with_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let repo = Self::new();
        if let Ok(mut state) = repo.state.lock() {
            state.live_users.extend(users.into_iter().map(Into::into));
        }
        repo
    }

    /// Audit entries written so far
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.state
            .lock()
            .map(|state| state.entries.clone())
            .unwrap_or_default()
    }

    pub fn is_live(&self, user_id: &str) -> bool {
        self.state
            .lock()
            .map(|state| state.live_users.contains(user_id))
            .unwrap_or(false)
    }
}

impl SoftDeleteRepository for MemoryAuditLogRepository {
    async fn soft_delete_user(&self, target: &UserId, entry: &AuditLogEntry) -> AuditResult<bool> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| AuditError::Internal("repository lock poisoned".to_string()))?;

        if !state.live_users.remove(target.as_str()) {
            return Ok(false);
        }
        state.entries.push(entry.clone());
        Ok(true)
    }
}
