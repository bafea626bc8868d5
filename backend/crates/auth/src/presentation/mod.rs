//! Presentation Layer
//!
//! Request extractors.

pub mod extract;

pub use extract::{MaybeSession, RequireSession};
