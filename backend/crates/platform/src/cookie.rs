//! Cookies
//!
//! Reading request cookies and rendering `Set-Cookie` values.

use std::fmt::{self, Write as _};

use http::header::InvalidHeaderValue;
use http::{HeaderMap, HeaderValue, header};

/// SameSite attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

/// Attributes of an issued cookie
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age_secs: Option<i64>,
}

impl CookieConfig {
    /// `name=value; Path=...; SameSite=...` plus the optional flags
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; SameSite={}",
            self.name, value, self.path, self.same_site
        );
        if let Some(max_age) = self.max_age_secs {
            let _ = write!(cookie, "; Max-Age={max_age}");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        cookie
    }
}

/// First value of `name` across every `Cookie` header
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` header value; fails on bytes a header cannot carry
pub fn set_cookie_header(
    config: &CookieConfig,
    value: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&config.build_set_cookie(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_readable(name: &str) -> CookieConfig {
        CookieConfig {
            name: name.to_string(),
            secure: true,
            http_only: false,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age_secs: Some(86400),
        }
    }

    #[test]
    fn test_build_set_cookie() {
        let cookie = script_readable("__Host-csrf-token").build_set_cookie("nonce.sig");
        assert_eq!(
            cookie,
            "__Host-csrf-token=nonce.sig; Path=/; SameSite=Lax; Max-Age=86400; Secure"
        );
    }

    #[test]
    fn test_http_only_flag() {
        let config = CookieConfig {
            http_only: true,
            secure: false,
            max_age_secs: None,
            ..script_readable("session-token")
        };
        assert_eq!(
            config.build_set_cookie("v"),
            "session-token=v; Path=/; SameSite=Lax; HttpOnly"
        );
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; csrf-token=abc.def; other=xyz"),
        );

        assert_eq!(extract_cookie(&headers, "csrf-token").as_deref(), Some("abc.def"));
        assert_eq!(extract_cookie(&headers, "foo").as_deref(), Some("bar"));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_cookie_first_match_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; b=first"));
        headers.append(header::COOKIE, HeaderValue::from_static("b=second"));

        assert_eq!(extract_cookie(&headers, "b").as_deref(), Some("first"));
    }

    #[test]
    fn test_set_cookie_header_rejects_control_chars() {
        let config = script_readable("csrf-token");
        assert!(set_cookie_header(&config, "bad\nvalue").is_err());
        assert!(set_cookie_header(&config, "good").is_ok());
    }
}
