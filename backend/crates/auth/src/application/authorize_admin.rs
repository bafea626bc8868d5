//! Authorize Admin Use Case
//!
//! Self-or-admin decision for privileged per-user operations.
//!
//! Decision order:
//! 1. no session → 401
//! 2. caller is the target → allow
//! 3. no admin identity configured → 503
//! 4. caller is the admin → allow
//! 5. otherwise → 403

use crate::domain::entity::session::Session;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Admin authorization gate
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    admin_user_id: Option<UserId>,
}

impl AdminGate {
    pub fn new(admin_user_id: Option<UserId>) -> Self {
        Self { admin_user_id }
    }

    pub fn is_configured(&self) -> bool {
        self.admin_user_id.is_some()
    }

    /// Authorize `operation` by the session holder against `target`
    pub fn authorize(
        &self,
        session: Option<&Session>,
        target: &UserId,
        operation: &str,
    ) -> AuthResult<()> {
        let Some(session) = session else {
            tracing::warn!(operation = %operation, "Privileged operation without session");
            return Err(AuthError::Unauthenticated);
        };

        if session.is_user(target) {
            return Ok(());
        }

        let Some(admin) = self.admin_user_id.as_ref() else {
            tracing::error!(
                operation = %operation,
                caller = %session.user_id,
                target = %target,
                "Cross-user operation refused: admin identity not configured"
            );
            return Err(AuthError::AdminNotConfigured);
        };

        if session.is_user(admin) {
            tracing::info!(
                operation = %operation,
                caller = %session.user_id,
                target = %target,
                "Admin operation authorized"
            );
            return Ok(());
        }

        tracing::warn!(
            operation = %operation,
            caller = %session.user_id,
            target = %target,
            "Cross-user operation forbidden"
        );
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).unwrap()
    }

    fn session(user: &str) -> Session {
        Session::new(uid(user), i64::MAX)
    }

    #[test]
    fn test_no_session_is_unauthenticated() {
        let gate = AdminGate::new(Some(uid("abc")));
        let err = gate.authorize(None, &uid("xyz"), "erase").unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[test]
    fn test_self_is_always_allowed() {
        assert!(AdminGate::new(None)
            .authorize(Some(&session("xyz")), &uid("xyz"), "erase")
            .is_ok());
        assert!(AdminGate::new(Some(uid("abc")))
            .authorize(Some(&session("xyz")), &uid("xyz"), "erase")
            .is_ok());
    }

    #[test]
    fn test_cross_user_without_admin_is_unavailable() {
        let err = AdminGate::new(None)
            .authorize(Some(&session("qrs")), &uid("xyz"), "erase")
            .unwrap_err();
        assert!(matches!(err, AuthError::AdminNotConfigured));
        assert_eq!(err.to_string(), "Service not configured for admin operations");
    }

    #[test]
    fn test_admin_is_allowed_and_others_forbidden() {
        let gate = AdminGate::new(Some(uid("abc")));
        assert!(gate.authorize(Some(&session("abc")), &uid("xyz"), "erase").is_ok());

        let err = gate
            .authorize(Some(&session("qrs")), &uid("xyz"), "erase")
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));
    }
}
