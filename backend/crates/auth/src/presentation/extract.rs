//! Session Extractors
//!
//! The request pipeline resolves the session once and stores it in request
//! extensions; handlers read it back through these extractors instead of
//! re-validating the token.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::entity::session::Session;
use crate::error::AuthError;

/// Session resolved by the pipeline, if any
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl MaybeSession {
    pub fn session(&self) -> Option<&Session> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(parts.extensions.get::<Session>().cloned()))
    }
}

/// Session resolved by the pipeline; rejects with 401 when absent
#[derive(Debug, Clone)]
pub struct RequireSession(pub Session);

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(RequireSession)
            .ok_or(AuthError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_id::UserId;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    async fn whoami(MaybeSession(session): MaybeSession) -> String {
        session
            .map(|s| s.user_id.to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    }

    async fn private(RequireSession(session): RequireSession) -> String {
        session.user_id.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route("/private", get(private))
    }

    fn with_session(uri: &str) -> Request<Body> {
        let mut req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(Session::new(UserId::new("abc").unwrap(), i64::MAX));
        req
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_maybe_session_reads_extension() {
        let response = app().oneshot(with_session("/whoami")).await.unwrap();
        assert_eq!(body_string(response).await, "abc");

        let anonymous = Request::builder().uri("/whoami").body(Body::empty()).unwrap();
        let response = app().oneshot(anonymous).await.unwrap();
        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn test_require_session_rejects_without_session() {
        let response = app().oneshot(with_session("/private")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let anonymous = Request::builder().uri("/private").body(Body::empty()).unwrap();
        let response = app().oneshot(anonymous).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
