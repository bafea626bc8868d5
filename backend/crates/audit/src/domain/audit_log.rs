//! Audit Log Entry
//!
//! One row per destructive operation. The actor is always the
//! authenticated caller; network attribution comes from the request context
//! when one is available.

use auth::UserId;
use chrono::{DateTime, Utc};
use kernel::id::AuditLogId;
use serde_json::{Map, Value};

use crate::domain::context::RequestContext;

/// Action recorded for a soft delete
pub const SOFT_DELETE_ACTION: &str = "soft_delete";

/// Target type for user records
pub const USER_TARGET_TYPE: &str = "user";

/// Audit log entry
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    pub actor_id: UserId,
    pub target_id: String,
    pub target_type: String,
    pub action: String,
    pub metadata: Map<String, Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn new(
        actor_id: UserId,
        target_id: impl Into<String>,
        target_type: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id: AuditLogId::new(),
            actor_id,
            target_id: target_id.into(),
            target_type: target_type.into(),
            action: action.into(),
            metadata: Map::new(),
            ip_address: None,
            user_agent: None,
            created_at: Utc::now(),
        }
    }

    /// Attach network attribution and the request id from a context
    pub fn with_context(mut self, context: &RequestContext) -> Self {
        self.ip_address = context.ip_address.clone();
        self.user_agent = context.user_agent.clone();
        self.metadata.insert(
            "requestId".to_string(),
            Value::String(context.request_id.to_string()),
        );
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Metadata as a JSON object value (for storage)
    pub fn metadata_json(&self) -> Value {
        Value::Object(self.metadata.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::RequestId;

    #[test]
    fn test_with_context_copies_attribution() {
        let request_id = RequestId::new();
        let ctx = RequestContext::new(
            request_id,
            Some(UserId::new("abc").unwrap()),
            Some("203.0.113.7".to_string()),
            Some("curl/8".to_string()),
        );

        let entry = AuditLogEntry::new(
            UserId::new("abc").unwrap(),
            "xyz",
            USER_TARGET_TYPE,
            SOFT_DELETE_ACTION,
        )
        .with_context(&ctx)
        .with_metadata("reason", "erasure request");

        assert_eq!(entry.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8"));
        assert_eq!(
            entry.metadata_json(),
            serde_json::json!({
                "requestId": request_id.to_string(),
                "reason": "erasure request",
            })
        );
    }
}
