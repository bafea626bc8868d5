//! Infrastructure Layer
//!
//! Rate limit store implementations.

pub mod backend;
pub mod postgres;
pub mod stub;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use backend::RateLimitBackend;
pub use postgres::PgRateLimitStore;
pub use stub::DisabledRateLimitStore;

#[cfg(any(test, feature = "test-util"))]
pub use memory::{FailingRateLimitStore, MemoryRateLimitStore};
