//! Validate Session Use Case
//!
//! Resolves the caller's session from a bearer token or session cookie.
//!
//! Token format: `<payload>.<signature>` where `payload` is unpadded base64url
//! of `{"sub": <user id>, "exp": <unix ms>}` and `signature` is
//! `platform::crypto::sign(payload)`.
//!
//! Every failure path yields `None`; a rejected token is never treated as an
//! error the caller has to handle.

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, header};
use chrono::Utc;
use platform::cookie::extract_cookie;
use platform::crypto::{self, SigningSecret};
use serde::{Deserialize, Serialize};

use crate::application::config::AuthConfig;
use crate::domain::entity::session::Session;
use crate::domain::value_object::user_id::UserId;

/// Longest token accepted before any decoding
pub const MAX_TOKEN_LENGTH: usize = 4096;

/// Signed session claims
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    exp: i64,
}

/// Where the token was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Bearer,
    Cookie,
    LegacyCookie,
}

impl TokenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSource::Bearer => "bearer",
            TokenSource::Cookie => "cookie",
            TokenSource::LegacyCookie => "legacy_cookie",
        }
    }
}

/// Why a token did not produce a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    NoToken,
    SecretUnavailable,
    MalformedToken,
    BadSignature,
    BadClaims,
    InvalidSubject,
    Expired,
}

impl SessionRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionRejection::NoToken => "no_token",
            SessionRejection::SecretUnavailable => "secret_unavailable",
            SessionRejection::MalformedToken => "malformed_token",
            SessionRejection::BadSignature => "bad_signature",
            SessionRejection::BadClaims => "bad_claims",
            SessionRejection::InvalidSubject => "invalid_subject",
            SessionRejection::Expired => "expired",
        }
    }
}

impl fmt::Display for SessionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session validator
#[derive(Debug, Clone)]
pub struct SessionValidator {
    config: Arc<AuthConfig>,
}

impl SessionValidator {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    /// Resolve the session for a request, logging denials with `path`
    pub fn validate(&self, headers: &HeaderMap, path: &str) -> Option<Session> {
        self.validate_at(headers, path, Utc::now().timestamp_millis())
    }

    /// Same as [`validate`](Self::validate) with an explicit clock
    pub fn validate_at(&self, headers: &HeaderMap, path: &str, now_ms: i64) -> Option<Session> {
        let Some((source, token)) = self.extract_token(headers) else {
            tracing::debug!(path = %path, "No session token presented");
            return None;
        };

        match self.verify_token(&token, now_ms) {
            Ok(session) => Some(session),
            Err(reason) => {
                tracing::warn!(
                    path = %path,
                    source = source.as_str(),
                    reason = %reason,
                    "Session token rejected"
                );
                None
            }
        }
    }

    /// Pick the token by source priority: bearer, current cookie, legacy cookie
    ///
    /// A cookie failing the character check counts as absent, so the next
    /// source is tried.
    pub fn extract_token(&self, headers: &HeaderMap) -> Option<(TokenSource, String)> {
        if let Some(token) = bearer_token(headers) {
            return Some((TokenSource::Bearer, token));
        }
        [
            (TokenSource::Cookie, &self.config.session_cookie_name),
            (TokenSource::LegacyCookie, &self.config.legacy_cookie_name),
        ]
        .into_iter()
        .find_map(|(source, name)| {
            let token = extract_cookie(headers, name).filter(|v| !v.is_empty())?;
            if is_well_formed(&token) {
                Some((source, token))
            } else {
                tracing::debug!(source = source.as_str(), "Ignoring malformed session cookie");
                None
            }
        })
    }

    /// Verify a raw token string
    pub fn verify_token(&self, token: &str, now_ms: i64) -> Result<Session, SessionRejection> {
        let secret = self
            .config
            .session_secret
            .as_ref()
            .ok_or(SessionRejection::SecretUnavailable)?;

        if !is_well_formed(token) {
            return Err(SessionRejection::MalformedToken);
        }
        let (payload, signature) = token
            .split_once('.')
            .ok_or(SessionRejection::MalformedToken)?;

        if !crypto::verify(payload, signature, secret) {
            return Err(SessionRejection::BadSignature);
        }

        let bytes = crypto::from_base64url(payload).map_err(|_| SessionRejection::BadClaims)?;
        let claims: SessionClaims =
            serde_json::from_slice(&bytes).map_err(|_| SessionRejection::BadClaims)?;
        let user_id = UserId::new(claims.sub).map_err(|_| SessionRejection::InvalidSubject)?;

        let session = Session::new(user_id, claims.exp);
        if session.is_expired_at(now_ms) {
            return Err(SessionRejection::Expired);
        }
        Ok(session)
    }
}

/// Character and shape check applied before any crypto
fn is_well_formed(token: &str) -> bool {
    if token.is_empty() || token.len() > MAX_TOKEN_LENGTH {
        return false;
    }
    let allowed = token
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'));
    if !allowed {
        return false;
    }
    match token.split_once('.') {
        Some((payload, signature)) => {
            !payload.is_empty() && !signature.is_empty() && !signature.contains('.')
        }
        None => false,
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Session token issuer
#[derive(Debug, Clone)]
pub struct SessionTokenIssuer {
    secret: SigningSecret,
    ttl_ms: i64,
}

impl SessionTokenIssuer {
    pub fn new(secret: SigningSecret, ttl_ms: i64) -> Self {
        Self { secret, ttl_ms }
    }

    /// Build from config; `None` when no secret is configured
    pub fn from_config(config: &AuthConfig) -> Option<Self> {
        config
            .session_secret
            .clone()
            .map(|secret| Self::new(secret, config.session_ttl_ms()))
    }

    /// Issue a token valid from now
    pub fn issue(&self, user_id: &UserId) -> String {
        self.issue_at(user_id, Utc::now().timestamp_millis())
    }

    /// Issue a token valid from `now_ms`
    pub fn issue_at(&self, user_id: &UserId, now_ms: i64) -> String {
        let claims = SessionClaims {
            sub: user_id.as_str().to_string(),
            exp: now_ms + self.ttl_ms,
        };
        // SessionClaims only holds a string and an integer
        let json = serde_json::to_vec(&claims).unwrap_or_default();
        let payload = crypto::to_base64url(&json);
        let signature = crypto::sign(&payload, &self.secret);
        format!("{payload}.{signature}")
    }
}
