//! Application Layer
//!
//! Use cases and background services.

pub mod config;
pub mod soft_delete;
pub mod sweeper;

// Re-exports
pub use config::AuditConfig;
pub use soft_delete::{SoftDeleteInput, SoftDeleteUseCase};
pub use sweeper::spawn_context_sweeper;
