//! Security Pipeline Middleware
//!
//! One `from_fn_with_state` layer in front of every route. Order per request:
//! CSRF, rate limit, session, redirects, audit context, security headers.
//! Each check runs at most once.

use std::any::Any;
use std::mem::take;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use audit::{AuditContextStore, RequestContext};
use auth::{Session, SessionValidator};
use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use futures::FutureExt;
use kernel::id::RequestId;
use platform::client::ClientInfo;
use platform::rate_limit::{RateLimitResult, RateLimitStore};

use crate::application::config::GuardConfig;
use crate::application::csrf::CsrfGuard;
use crate::application::rate_limiter::{RateLimiter, apply_rate_limit_headers};
use crate::domain::csp::{CspNonce, CspPolicy, HARDENING_HEADERS};
use crate::domain::route::{is_safe_method, sign_in_location};
use crate::error::{GuardError, GuardResult};
use crate::presentation::cleanup::{CleanupBody, ContextCleanup};

/// Request id of an authenticated API request
pub const INTERNAL_REQUEST_ID: HeaderName = HeaderName::from_static("x-internal-request-id");
pub const INTERNAL_USER_ID: HeaderName = HeaderName::from_static("x-internal-user-id");
pub const INTERNAL_CLIENT_IP: HeaderName = HeaderName::from_static("x-internal-client-ip");
pub const INTERNAL_USER_AGENT: HeaderName = HeaderName::from_static("x-internal-user-agent");

const INTERNAL_HEADERS: [HeaderName; 4] = [
    INTERNAL_REQUEST_ID,
    INTERNAL_USER_ID,
    INTERNAL_CLIENT_IP,
    INTERNAL_USER_AGENT,
];

/// Shared pipeline state
pub struct GuardState<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    pub config: Arc<GuardConfig>,
    pub csrf: CsrfGuard,
    pub limiter: RateLimiter<S>,
    pub sessions: SessionValidator,
    pub contexts: Arc<dyn AuditContextStore>,
}

impl<S> GuardState<S>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    pub fn new(
        config: GuardConfig,
        store: Arc<S>,
        sessions: SessionValidator,
        contexts: Arc<dyn AuditContextStore>,
    ) -> Self {
        let csrf = CsrfGuard::new(&config);
        let limiter = RateLimiter::new(store, config.store_timeout);
        Self {
            config: Arc::new(config),
            csrf,
            limiter,
            sessions,
            contexts,
        }
    }
}

/// Headers the pipeline adds to the handler's response
#[derive(Default)]
struct ResponseAdditions {
    csrf_cookie: Option<HeaderValue>,
    rate_limit: Option<RateLimitResult>,
    csp: Option<String>,
    cleanup: Option<ContextCleanup>,
}

/// Request-time security pipeline
pub async fn security_pipeline<S>(
    State(state): State<Arc<GuardState<S>>>,
    req: Request,
    next: Next,
) -> Response
where
    S: RateLimitStore + Send + Sync + 'static,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut additions = ResponseAdditions::default();
    let outcome = match AssertUnwindSafe(run_pipeline(&state, req, next, &mut additions))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(panic) => {
            tracing::error!(
                method = %method,
                path = %path,
                panic = panic_message(panic.as_ref()),
                "Request handler panicked"
            );
            std::panic::resume_unwind(panic);
        }
    };

    match outcome {
        Ok(response) => response,
        Err(e) => {
            if matches!(e, GuardError::Internal(_)) {
                tracing::error!(method = %method, path = %path, error = %e, "Security pipeline failed");
            }
            let mut response = e.into_response();
            if let Some(cookie) = additions.csrf_cookie.take() {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            response
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Run every check; headers gathered so far stay in `additions` when a
/// check short-circuits
async fn run_pipeline<S>(
    state: &GuardState<S>,
    mut req: Request,
    next: Next,
    additions: &mut ResponseAdditions,
) -> GuardResult<Response>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    let config = &state.config;
    let routes = &config.routes;
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    for name in &INTERNAL_HEADERS {
        req.headers_mut().remove(name);
    }

    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let client = ClientInfo::from_headers(req.headers(), direct_ip, config.trust_proxy);

    let is_api = routes.is_api(&path);
    let guarded_api = routes.is_guarded_api(&path);

    // CSRF
    if guarded_api {
        if is_safe_method(&method) {
            additions.csrf_cookie = state.csrf.cookie_for_safe_request(req.headers())?;
        } else {
            state
                .csrf
                .verify_unsafe_request(req.headers())
                .map_err(GuardError::CsrfRejected)?;
        }
    }

    // Rate limit
    if guarded_api {
        if let Some(rule) = config.rate_limit_rule(&path) {
            let identifier = rule.identifier(client.ip);
            let result = state
                .limiter
                .check(&identifier, &rule.limit)
                .await
                .map_err(GuardError::RateLimitUnavailable)?;
            if !result.allowed {
                tracing::debug!(identifier = %identifier, path = %path, "Window full");
                let retry_after_secs = result.retry_after_secs(now_ms());
                return Err(GuardError::RateLimited {
                    result,
                    retry_after_secs,
                });
            }
            additions.rate_limit = Some(result);
        }
    }

    // Session and redirects
    let protected = routes.is_protected(&path);
    let auth_only = routes.is_auth_only(&path);
    let session = if protected || auth_only {
        state.sessions.validate(req.headers(), &path)
    } else {
        None
    };

    if protected && session.is_none() {
        if is_api {
            return Err(GuardError::Unauthenticated { path });
        }
        let original = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or(path.as_str());
        let location = sign_in_location(&routes.sign_in, original);
        tracing::debug!(path = %path, "Redirecting to sign-in");
        return Ok(finish(Redirect::temporary(&location).into_response(), take(additions)));
    }

    if auth_only && session.is_some() {
        tracing::debug!(path = %path, "Signed-in caller on auth-only route");
        return Ok(finish(
            Redirect::temporary(&routes.landing).into_response(),
            take(additions),
        ));
    }

    if let Some(session) = session {
        if is_api {
            additions.cleanup = register_context(state, &mut req, &session, &client);
        }
        req.extensions_mut().insert(session);
    }

    // Page nonce
    if !is_api {
        let nonce = CspNonce::generate();
        additions.csp = Some(CspPolicy::for_page(&nonce, config.is_production()).to_header_value());
        req.extensions_mut().insert(nonce);
    }

    let response = next.run(req).await;
    Ok(finish(response, take(additions)))
}

/// Register the audit context and forward it as internal headers
///
/// Failures are logged and the request continues without a context.
fn register_context<S>(
    state: &GuardState<S>,
    req: &mut Request,
    session: &Session,
    client: &ClientInfo,
) -> Option<ContextCleanup>
where
    S: RateLimitStore + Send + Sync + 'static,
{
    let request_id = RequestId::new();
    let context = RequestContext::new(
        request_id,
        Some(session.user_id.clone()),
        client.ip_string(),
        client.user_agent.clone(),
    );

    if let Err(e) = state.contexts.set(context) {
        tracing::warn!(request_id = %request_id, error = %e, "Failed to register request context");
        return None;
    }

    let headers = req.headers_mut();
    insert_internal(headers, INTERNAL_REQUEST_ID, &request_id.to_string());
    insert_internal(headers, INTERNAL_USER_ID, session.user_id.as_str());
    if let Some(ip) = client.ip_string() {
        insert_internal(headers, INTERNAL_CLIENT_IP, &ip);
    }
    if let Some(user_agent) = client.user_agent.as_deref() {
        insert_internal(headers, INTERNAL_USER_AGENT, user_agent);
    }

    Some(ContextCleanup::new(state.contexts.clone(), request_id))
}

fn insert_internal(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::debug!(header = %name, "Skipping non-ASCII internal header"),
    }
}

/// Merge pipeline headers into the response and attach deferred cleanup
fn finish(mut response: Response, additions: ResponseAdditions) -> Response {
    let headers = response.headers_mut();

    if let Some(cookie) = additions.csrf_cookie {
        headers.append(header::SET_COOKIE, cookie);
    }
    if let Some(result) = &additions.rate_limit {
        apply_rate_limit_headers(headers, result);
    }
    if let Some(csp) = additions.csp {
        match HeaderValue::from_str(&csp) {
            Ok(value) => {
                headers.insert(header::CONTENT_SECURITY_POLICY, value);
            }
            Err(e) => tracing::error!(error = %e, "Invalid CSP header value"),
        }
        for (name, value) in HARDENING_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }

    match additions.cleanup {
        Some(cleanup) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, CleanupBody::wrap(body, cleanup))
        }
        None => response,
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
