//! Domain Layer
//!
//! Request context, audit log entries and the storage contracts.

pub mod audit_log;
pub mod context;
pub mod context_store;
pub mod repository;

// Re-exports
pub use audit_log::{AuditLogEntry, SOFT_DELETE_ACTION, USER_TARGET_TYPE};
pub use context::RequestContext;
pub use context_store::{AuditContextStore, ContextStoreError};
pub use repository::{LocalSoftDeleteRepository, SoftDeleteRepository};
