//! API Router

use std::sync::Arc;

use audit::domain::SoftDeleteRepository;
use axum::middleware::from_fn_with_state;
use axum::{
    Router,
    routing::{get, post},
};
use guard::{GuardState, security_pipeline};
use platform::rate_limit::RateLimitStore;

use crate::handlers::{self, ApiState};

/// Build the API router behind the security pipeline
pub fn api_router<R, S>(state: ApiState<R>, guard: Arc<GuardState<S>>) -> Router
where
    R: SoftDeleteRepository + Send + Sync + 'static,
    S: RateLimitStore + Send + Sync + 'static,
{
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/auth/session", get(handlers::session_status::<R>))
        .route("/api/auth/csrf", get(handlers::csrf))
        .route("/api/users/{id}/erase", post(handlers::erase_user::<R>))
        .with_state(state)
        .layer(from_fn_with_state(guard, security_pipeline::<S>))
}
