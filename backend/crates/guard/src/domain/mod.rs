//! Domain Layer
//!
//! Route matching, CSRF token and CSP policy.

pub mod csp;
pub mod csrf_token;
pub mod route;

// Re-exports
pub use csp::{CspNonce, CspPolicy};
pub use csrf_token::CsrfToken;
