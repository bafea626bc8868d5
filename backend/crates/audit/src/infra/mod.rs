//! Infrastructure Layer
//!
//! Storage implementations.

pub mod context_store;
pub mod postgres;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use context_store::DashMapContextStore;
pub use postgres::PgAuditRepository;

#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryAuditLogRepository;
