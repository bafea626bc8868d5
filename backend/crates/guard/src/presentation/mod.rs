pub mod cleanup;
pub mod middleware;

pub use cleanup::{CleanupBody, ContextCleanup};
pub use middleware::{
    GuardState, INTERNAL_CLIENT_IP, INTERNAL_REQUEST_ID, INTERNAL_USER_AGENT, INTERNAL_USER_ID,
    security_pipeline,
};
