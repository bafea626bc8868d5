//! Soft Delete Use Case
//!
//! Marks a user deleted and records who did it. Attribution (IP, user agent,
//! request id) comes from the request context the pipeline registered; when
//! none is found the entry is still written with the caller as actor.

use std::sync::Arc;

use auth::UserId;
use kernel::id::RequestId;

use crate::domain::audit_log::{AuditLogEntry, SOFT_DELETE_ACTION, USER_TARGET_TYPE};
use crate::domain::context_store::AuditContextStore;
use crate::domain::repository::SoftDeleteRepository;
use crate::error::{AuditError, AuditResult};

/// Soft delete input
#[derive(Debug, Clone)]
pub struct SoftDeleteInput {
    /// Authenticated caller
    pub actor: UserId,
    /// User to delete
    pub target: UserId,
    /// Pipeline request id, when the handler received one
    pub request_id: Option<RequestId>,
}

/// Soft delete use case
pub struct SoftDeleteUseCase<R>
where
    R: SoftDeleteRepository + Send + Sync + 'static,
{
    repo: Arc<R>,
    contexts: Arc<dyn AuditContextStore>,
}

impl<R> SoftDeleteUseCase<R>
where
    R: SoftDeleteRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, contexts: Arc<dyn AuditContextStore>) -> Self {
        Self { repo, contexts }
    }

    pub async fn execute(&self, input: SoftDeleteInput) -> AuditResult<AuditLogEntry> {
        let mut entry = AuditLogEntry::new(
            input.actor.clone(),
            input.target.as_str(),
            USER_TARGET_TYPE,
            SOFT_DELETE_ACTION,
        );

        match input.request_id.and_then(|id| self.contexts.get(&id)) {
            Some(context) => {
                if context.user_id.as_ref() != Some(&input.actor) {
                    tracing::warn!(
                        request_id = %context.request_id,
                        actor_id = %input.actor,
                        "Request context belongs to a different user"
                    );
                }
                entry = entry.with_context(&context);
            }
            None => {
                tracing::warn!(
                    actor_id = %input.actor,
                    target_id = %input.target,
                    "No request context for soft delete, writing entry without attribution"
                );
                entry = entry.with_metadata("contextMissing", true);
            }
        }

        if !self.repo.soft_delete_user(&input.target, &entry).await? {
            return Err(AuditError::TargetNotFound);
        }

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::RequestContext;
    use crate::infra::context_store::DashMapContextStore;
    use crate::infra::memory::MemoryAuditLogRepository;

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).unwrap()
    }

    fn setup() -> (
        SoftDeleteUseCase<MemoryAuditLogRepository>,
        MemoryAuditLogRepository,
        DashMapContextStore,
    ) {
        let repo = MemoryAuditLogRepository::with_users(["xyz"]);
        let contexts = DashMapContextStore::new();
        let use_case = SoftDeleteUseCase::new(Arc::new(repo.clone()), Arc::new(contexts.clone()));
        (use_case, repo, contexts)
    }

    #[tokio::test]
    async fn test_entry_carries_request_context() {
        let (use_case, repo, contexts) = setup();
        let request_id = RequestId::new();
        contexts
            .set(RequestContext::new(
                request_id,
                Some(uid("abc")),
                Some("198.51.100.4".to_string()),
                Some("Mozilla/5.0".to_string()),
            ))
            .unwrap();

        let entry = use_case
            .execute(SoftDeleteInput {
                actor: uid("abc"),
                target: uid("xyz"),
                request_id: Some(request_id),
            })
            .await
            .unwrap();

        assert_eq!(entry.actor_id.as_str(), "abc");
        assert_eq!(entry.target_id, "xyz");
        assert_eq!(entry.action, SOFT_DELETE_ACTION);
        assert_eq!(entry.ip_address.as_deref(), Some("198.51.100.4"));
        assert_eq!(repo.entries(), vec![entry]);
        assert!(!repo.is_live("xyz"));
    }

    #[tokio::test]
    async fn test_missing_context_still_writes_entry() {
        let (use_case, repo, _) = setup();

        let entry = use_case
            .execute(SoftDeleteInput {
                actor: uid("abc"),
                target: uid("xyz"),
                request_id: Some(RequestId::new()),
            })
            .await
            .unwrap();

        assert!(entry.ip_address.is_none());
        assert_eq!(entry.metadata.get("contextMissing"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(repo.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let (use_case, repo, _) = setup();

        let err = use_case
            .execute(SoftDeleteInput {
                actor: uid("abc"),
                target: uid("nobody"),
                request_id: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::TargetNotFound));
        assert!(repo.entries().is_empty());
    }
}
