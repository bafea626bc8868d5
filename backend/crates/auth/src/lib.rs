//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Session entity, user id value object
//! - `application/` - Session validation/issuance, admin gate, config
//! - `presentation/` - Extractors for the pipeline-resolved session
//!
//! ## Features
//! - Stateless signed session tokens (`payload.signature`)
//! - Bearer header, current cookie and legacy cookie sources
//! - Self-or-admin authorization for per-user operations
//!
//! ## Security Model
//! - Tokens are HMAC-SHA256 signed with a ≥32 byte secret
//! - Format is checked before any crypto work
//! - Any failure means "no session", never an error path

pub mod application;
pub mod domain;
pub mod error;
pub mod presentation;

// Re-exports for convenience
pub use application::{AdminGate, AuthConfig, SessionTokenIssuer, SessionValidator};
pub use domain::{Session, UserId};
pub use error::{AuthError, AuthResult};
pub use presentation::{MaybeSession, RequireSession};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
