//! Guard (Request Pipeline) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Route matching, CSRF token, CSP policy
//! - `application/` - CSRF guard, rate limiter, window sweeper, config
//! - `infra/` - PostgreSQL sliding-window store, build-phase stub
//! - `presentation/` - Pipeline middleware, deferred context cleanup
//!
//! ## Security Model
//! - Fail closed: a CSRF failure is 403, a full window is 429, a store that
//!   errors or exceeds its timeout is 503
//! - The session is resolved once and handed to handlers via extensions
//! - Inbound `x-internal-*` headers are always stripped
//! - Audit context enrichment is the only step allowed to fail open

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{
    CsrfGuard, GuardConfig, RateLimitRule, RateLimiter, RoutePolicy, spawn_window_sweeper,
};
pub use domain::{CspNonce, CspPolicy, CsrfToken};
pub use error::{GuardError, GuardResult};
pub use infra::{DisabledRateLimitStore, PgRateLimitStore, RateLimitBackend};
pub use presentation::{GuardState, security_pipeline};

#[cfg(any(test, feature = "test-util"))]
pub use infra::{FailingRateLimitStore, MemoryRateLimitStore};
