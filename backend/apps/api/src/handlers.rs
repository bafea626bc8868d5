//! HTTP Handlers

use std::sync::Arc;

use audit::domain::SoftDeleteRepository;
use audit::{AuditContextStore, SoftDeleteInput, SoftDeleteUseCase};
use auth::{AdminGate, AuthConfig, AuthError, RequireSession, SessionValidator, UserId};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use guard::presentation::INTERNAL_REQUEST_ID;
use kernel::id::RequestId;

use crate::dto::{EraseResponse, HealthResponse, SessionStatusResponse};
use crate::error::ApiResult;

/// Operation name recorded by the admin gate
const ERASE_USER_OPERATION: &str = "erase_user";

/// Shared state for API handlers
pub struct ApiState<R>
where
    R: SoftDeleteRepository + Send + Sync + 'static,
{
    pub sessions: SessionValidator,
    pub admin: AdminGate,
    pub soft_delete: Arc<SoftDeleteUseCase<R>>,
}

impl<R> Clone for ApiState<R>
where
    R: SoftDeleteRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            admin: self.admin.clone(),
            soft_delete: self.soft_delete.clone(),
        }
    }
}

impl<R> ApiState<R>
where
    R: SoftDeleteRepository + Send + Sync + 'static,
{
    pub fn new(auth: Arc<AuthConfig>, repo: Arc<R>, contexts: Arc<dyn AuditContextStore>) -> Self {
        Self {
            admin: AdminGate::new(auth.admin_user_id.clone()),
            sessions: SessionValidator::new(auth),
            soft_delete: Arc::new(SoftDeleteUseCase::new(repo, contexts)),
        }
    }
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /api/auth/session
///
/// Read-only probe; never fails, an invalid token reads as signed out.
pub async fn session_status<R>(
    State(state): State<ApiState<R>>,
    headers: HeaderMap,
) -> Json<SessionStatusResponse>
where
    R: SoftDeleteRepository + Send + Sync + 'static,
{
    let session = state.sessions.validate(&headers, "/api/auth/session");
    Json(SessionStatusResponse {
        authenticated: session.is_some(),
        user_id: session.as_ref().map(|s| s.user_id.to_string()),
        expires_at_ms: session.as_ref().map(|s| s.expires_at_ms),
    })
}

/// GET /api/auth/csrf
///
/// Empty response; the pipeline attaches the CSRF cookie.
pub async fn csrf() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// POST /api/users/{id}/erase
pub async fn erase_user<R>(
    State(state): State<ApiState<R>>,
    RequireSession(session): RequireSession,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<EraseResponse>>
where
    R: SoftDeleteRepository + Send + Sync + 'static,
{
    let target = UserId::new(id).map_err(AuthError::from)?;
    state
        .admin
        .authorize(Some(&session), &target, ERASE_USER_OPERATION)?;

    let request_id = headers
        .get(INTERNAL_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<RequestId>().ok());

    let entry = state
        .soft_delete
        .execute(SoftDeleteInput {
            actor: session.user_id,
            target,
            request_id,
        })
        .await?;

    Ok(Json(EraseResponse {
        erased: entry.target_id,
    }))
}
