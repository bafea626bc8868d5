//! Application Layer
//!
//! Use cases and application services.

pub mod authorize_admin;
pub mod config;
pub mod validate_session;

// Re-exports
pub use authorize_admin::AdminGate;
pub use config::AuthConfig;
pub use validate_session::{SessionRejection, SessionTokenIssuer, SessionValidator, TokenSource};
