//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use auth::UserId;

use crate::domain::audit_log::AuditLogEntry;
use crate::error::AuditResult;

/// Soft delete repository trait
#[trait_variant::make(SoftDeleteRepository: Send)]
pub trait LocalSoftDeleteRepository {
    /// Mark the user deleted and record `entry` atomically
    ///
    /// Returns `false` when no live user matched (nothing written).
    async fn soft_delete_user(&self, target: &UserId, entry: &AuditLogEntry) -> AuditResult<bool>;
}
