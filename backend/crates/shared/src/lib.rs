//! Kernel
//!
//! Vocabulary every pipeline crate agrees on: the error classes a check can
//! fail with, and the identifiers that tie a request to its audit entries.
//! Optional `sqlx` and `axum` features add the database classification and
//! the HTTP rendering of [`error::app_error::AppError`].

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
