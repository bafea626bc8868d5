//! CSRF Guard
//!
//! Double-submit check for API routes:
//! - safe methods get a token cookie minted when they lack a valid one
//! - unsafe methods need the cookie, an identical `x-csrf-token` header,
//!   a valid signature and a same-origin request
//!
//! The token is never echoed in a response header.

use std::fmt;

use axum::http::{HeaderMap, HeaderValue, header};
use platform::client::X_FORWARDED_HOST;
use platform::cookie::{CookieConfig, extract_cookie, set_cookie_header};
use platform::crypto::{SigningSecret, constant_time_eq};
use url::Url;

use crate::application::config::{CSRF_HEADER, GuardConfig};
use crate::domain::csrf_token::CsrfToken;
use crate::error::{GuardError, GuardResult};

/// Why an unsafe request failed the CSRF check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfRejection {
    MissingCookie,
    MissingHeader,
    TokenMismatch,
    InvalidToken,
    MissingHost,
    HostMismatch,
    OriginMismatch,
    /// Production without an expected origin: the host cannot be checked
    OriginUnconfigured,
}

impl CsrfRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            CsrfRejection::MissingCookie => "missing_cookie",
            CsrfRejection::MissingHeader => "missing_header",
            CsrfRejection::TokenMismatch => "token_mismatch",
            CsrfRejection::InvalidToken => "invalid_token",
            CsrfRejection::MissingHost => "missing_host",
            CsrfRejection::HostMismatch => "host_mismatch",
            CsrfRejection::OriginMismatch => "origin_mismatch",
            CsrfRejection::OriginUnconfigured => "origin_unconfigured",
        }
    }
}

impl fmt::Display for CsrfRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CSRF guard
#[derive(Debug, Clone)]
pub struct CsrfGuard {
    secret: SigningSecret,
    cookie: CookieConfig,
    trust_proxy: bool,
    /// Normalized expected origin and its authority
    expected: Option<(String, String)>,
    /// Refuse unsafe requests when `expected` is missing
    require_expected: bool,
}

impl CsrfGuard {
    pub fn new(config: &GuardConfig) -> Self {
        let expected = config.app_origin.as_deref().and_then(|raw| {
            let normalized = normalize_origin(raw);
            if normalized.is_none() {
                tracing::warn!(origin = %raw, "Ignoring unparsable app origin");
            }
            normalized
        });
        let require_expected = config.is_production();
        if require_expected && expected.is_none() {
            tracing::error!("No app origin configured, unsafe API requests will be refused");
        }

        Self {
            secret: config.csrf_secret.clone(),
            cookie: config.csrf_cookie(),
            trust_proxy: config.trust_proxy,
            expected,
            require_expected,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie.name
    }

    /// Safe-method pass: `Set-Cookie` value when a fresh token is needed
    pub fn cookie_for_safe_request(&self, headers: &HeaderMap) -> GuardResult<Option<HeaderValue>> {
        let current_is_valid = extract_cookie(headers, &self.cookie.name)
            .and_then(|raw| CsrfToken::parse(&raw))
            .is_some_and(|token| token.verify(&self.secret));
        if current_is_valid {
            return Ok(None);
        }

        let token = CsrfToken::mint(&self.secret);
        let value = set_cookie_header(&self.cookie, &token.encode())
            .map_err(|e| GuardError::Internal(format!("CSRF cookie header: {e}")))?;
        tracing::debug!("Minted CSRF token");
        Ok(Some(value))
    }

    /// Unsafe-method check
    pub fn verify_unsafe_request(&self, headers: &HeaderMap) -> Result<(), CsrfRejection> {
        let cookie = extract_cookie(headers, &self.cookie.name)
            .filter(|v| !v.is_empty())
            .ok_or(CsrfRejection::MissingCookie)?;
        let echoed = headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(CsrfRejection::MissingHeader)?;

        if !constant_time_eq(cookie.as_bytes(), echoed.as_bytes()) {
            return Err(CsrfRejection::TokenMismatch);
        }

        let valid = CsrfToken::parse(&cookie).is_some_and(|token| token.verify(&self.secret));
        if !valid {
            return Err(CsrfRejection::InvalidToken);
        }

        self.verify_origin(headers)
    }

    /// Origin/Host validation
    ///
    /// With an expected origin the effective host must be its authority and
    /// a present `Origin` must equal it. Production refuses to run without
    /// one. Elsewhere a present `Origin` must name the effective host. A
    /// missing `Origin` is accepted: the token check already proved
    /// same-site script access.
    fn verify_origin(&self, headers: &HeaderMap) -> Result<(), CsrfRejection> {
        let host = self.effective_host(headers).ok_or(CsrfRejection::MissingHost)?;
        let origin = headers
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::trim);

        match &self.expected {
            Some((expected_origin, expected_authority)) => {
                if !host.eq_ignore_ascii_case(expected_authority) {
                    return Err(CsrfRejection::HostMismatch);
                }
                match origin {
                    None => Ok(()),
                    Some(origin) => match normalize_origin(origin) {
                        Some((normalized, _)) if &normalized == expected_origin => Ok(()),
                        _ => Err(CsrfRejection::OriginMismatch),
                    },
                }
            }
            None if self.require_expected => Err(CsrfRejection::OriginUnconfigured),
            None => match origin {
                None => Ok(()),
                Some(origin) => match normalize_origin(origin) {
                    Some((_, authority)) if authority.eq_ignore_ascii_case(&host) => Ok(()),
                    _ => Err(CsrfRejection::OriginMismatch),
                },
            },
        }
    }

    /// `X-Forwarded-Host` (first entry) when proxies are trusted, else `Host`
    fn effective_host(&self, headers: &HeaderMap) -> Option<String> {
        let forwarded = self
            .trust_proxy
            .then(|| headers.get(X_FORWARDED_HOST))
            .flatten()
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let host = forwarded.or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })?;

        Some(host.to_ascii_lowercase())
    }
}

/// Parse an origin into `(scheme://authority, authority)`
///
/// Default ports are dropped so `https://a.example:443` equals
/// `https://a.example`. Opaque origins (`null`) yield `None`.
fn normalize_origin(raw: &str) -> Option<(String, String)> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let authority = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    };
    Some((format!("{}://{}", url.scheme(), authority), authority))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard_with(app_origin: Option<&str>, trust_proxy: bool) -> (CsrfGuard, String) {
        let config = GuardConfig {
            app_origin: app_origin.map(str::to_string),
            trust_proxy,
            ..GuardConfig::development()
        };
        let token = CsrfToken::mint(&config.csrf_secret).encode();
        (CsrfGuard::new(&config), token)
    }

    fn unsafe_headers(cookie: &str, header_token: &str, host: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("csrf-token={cookie}")).unwrap(),
        );
        headers.insert(CSRF_HEADER, HeaderValue::from_str(header_token).unwrap());
        headers.insert(header::HOST, HeaderValue::from_str(host).unwrap());
        headers
    }

    #[test]
    fn test_safe_request_mints_when_absent() {
        let (guard, _) = guard_with(None, false);
        let value = guard
            .cookie_for_safe_request(&HeaderMap::new())
            .unwrap()
            .unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("csrf-token="));
        assert!(!value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Max-Age=86400"));
    }

    #[test]
    fn test_safe_request_keeps_valid_cookie() {
        let (guard, token) = guard_with(None, false);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("csrf-token={token}")).unwrap(),
        );
        assert!(guard.cookie_for_safe_request(&headers).unwrap().is_none());
    }

    #[test]
    fn test_safe_request_replaces_forged_cookie() {
        let (guard, _) = guard_with(None, false);
        let (_, foreign) = guard_with(None, false);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("csrf-token={foreign}")).unwrap(),
        );
        assert!(guard.cookie_for_safe_request(&headers).unwrap().is_some());
    }

    #[test]
    fn test_unsafe_request_accepts_matching_token() {
        let (guard, token) = guard_with(None, false);
        let headers = unsafe_headers(&token, &token, "app.example");
        assert_eq!(guard.verify_unsafe_request(&headers), Ok(()));
    }

    #[test]
    fn test_unsafe_request_rejections() {
        let (guard, token) = guard_with(None, false);
        let (_, foreign) = guard_with(None, false);

        let mut headers = unsafe_headers(&token, &token, "app.example");
        headers.remove(header::COOKIE);
        assert_eq!(
            guard.verify_unsafe_request(&headers),
            Err(CsrfRejection::MissingCookie)
        );

        let mut headers = unsafe_headers(&token, &token, "app.example");
        headers.remove(CSRF_HEADER);
        assert_eq!(
            guard.verify_unsafe_request(&headers),
            Err(CsrfRejection::MissingHeader)
        );

        let headers = unsafe_headers(&token, &foreign, "app.example");
        assert_eq!(
            guard.verify_unsafe_request(&headers),
            Err(CsrfRejection::TokenMismatch)
        );

        let headers = unsafe_headers(&foreign, &foreign, "app.example");
        assert_eq!(
            guard.verify_unsafe_request(&headers),
            Err(CsrfRejection::InvalidToken)
        );
    }

    #[test]
    fn test_origin_must_match_host() {
        let (guard, token) = guard_with(None, false);

        let mut headers = unsafe_headers(&token, &token, "app.example");
        headers.insert(header::ORIGIN, HeaderValue::from_static("https://app.example"));
        assert_eq!(guard.verify_unsafe_request(&headers), Ok(()));

        headers.insert(header::ORIGIN, HeaderValue::from_static("https://evil.example"));
        assert_eq!(
            guard.verify_unsafe_request(&headers),
            Err(CsrfRejection::OriginMismatch)
        );

        headers.insert(header::ORIGIN, HeaderValue::from_static("null"));
        assert_eq!(
            guard.verify_unsafe_request(&headers),
            Err(CsrfRejection::OriginMismatch)
        );

        headers.remove(header::HOST);
        assert_eq!(
            guard.verify_unsafe_request(&headers),
            Err(CsrfRejection::MissingHost)
        );
    }

    #[test]
    fn test_expected_origin() {
        let (guard, token) = guard_with(Some("https://app.example"), false);

        let mut headers = unsafe_headers(&token, &token, "app.example");
        headers.insert(header::ORIGIN, HeaderValue::from_static("https://app.example:443"));
        assert_eq!(guard.verify_unsafe_request(&headers), Ok(()));

        headers.insert(header::ORIGIN, HeaderValue::from_static("http://app.example"));
        assert_eq!(
            guard.verify_unsafe_request(&headers),
            Err(CsrfRejection::OriginMismatch)
        );

        let headers = unsafe_headers(&token, &token, "other.example");
        assert_eq!(
            guard.verify_unsafe_request(&headers),
            Err(CsrfRejection::HostMismatch)
        );
    }

    #[test]
    fn test_production_without_origin_refuses_unsafe_requests() {
        let config = GuardConfig::default();
        let guard = CsrfGuard::new(&config);
        let token = CsrfToken::mint(&config.csrf_secret).encode();

        let mut headers = unsafe_headers(&token, &token, "attacker-rebound.example");
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("__Host-csrf-token={token}")).unwrap(),
        );
        assert_eq!(
            guard.verify_unsafe_request(&headers),
            Err(CsrfRejection::OriginUnconfigured)
        );

        let config = GuardConfig {
            app_origin: Some("https://app.example".to_string()),
            ..GuardConfig::default()
        };
        let guard = CsrfGuard::new(&config);
        let token = CsrfToken::mint(&config.csrf_secret).encode();
        let mut headers = unsafe_headers(&token, &token, "attacker-rebound.example");
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("__Host-csrf-token={token}")).unwrap(),
        );
        assert_eq!(
            guard.verify_unsafe_request(&headers),
            Err(CsrfRejection::HostMismatch)
        );
        headers.insert(header::HOST, HeaderValue::from_static("app.example"));
        assert_eq!(guard.verify_unsafe_request(&headers), Ok(()));
    }

    #[test]
    fn test_forwarded_host_only_with_trusted_proxy() {
        let (untrusted, token) = guard_with(Some("https://app.example"), false);
        let mut headers = unsafe_headers(&token, &token, "internal:8080");
        headers.insert(X_FORWARDED_HOST, HeaderValue::from_static("app.example"));
        assert_eq!(
            untrusted.verify_unsafe_request(&headers),
            Err(CsrfRejection::HostMismatch)
        );

        let config = GuardConfig {
            app_origin: Some("https://app.example".to_string()),
            trust_proxy: true,
            ..GuardConfig::development()
        };
        let trusted = CsrfGuard::new(&config);
        let token = CsrfToken::mint(&config.csrf_secret).encode();
        let mut headers = unsafe_headers(&token, &token, "internal:8080");
        headers.insert(X_FORWARDED_HOST, HeaderValue::from_static("app.example"));
        assert_eq!(trusted.verify_unsafe_request(&headers), Ok(()));
    }
}
