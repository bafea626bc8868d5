//! Audit Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Request context, audit log entry, storage contracts
//! - `application/` - Soft delete use case, context sweeper, config
//! - `infra/` - DashMap context store, PostgreSQL repository
//!
//! ## Lifecycle of a request context
//! 1. The pipeline registers it after resolving the session (API routes only)
//! 2. The soft delete use case reads it to attribute the audit entry
//! 3. Deferred cleanup removes it once the response body is dropped
//! 4. The sweeper removes anything left behind after `max_context_age`
//!
//! Context failures are logged and never fail the request.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::{AuditConfig, SoftDeleteInput, SoftDeleteUseCase, spawn_context_sweeper};
pub use domain::{AuditContextStore, AuditLogEntry, ContextStoreError, RequestContext};
pub use error::{AuditError, AuditResult};
pub use infra::{DashMapContextStore, PgAuditRepository};

#[cfg(any(test, feature = "test-util"))]
pub use infra::MemoryAuditLogRepository;
