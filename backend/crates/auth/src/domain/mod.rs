//! Domain Layer
//!
//! Contains entities and value objects.

pub mod entity;
pub mod value_object;

// Re-exports
pub use entity::session::Session;
pub use value_object::user_id::UserId;
