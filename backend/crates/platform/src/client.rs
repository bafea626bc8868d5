//! Client identification utilities
//!
//! Proxy-trust-aware client IP resolution and User-Agent extraction.
//!
//! Proxy headers are attacker-controlled unless a verified reverse proxy
//! rewrites them, so they are consulted only when `trust_proxy` is enabled.

use http::{HeaderMap, header};
use std::net::IpAddr;

pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";
pub const X_REAL_IP: &str = "x-real-ip";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Longest textual IPv6 form (with embedded IPv4)
const MAX_IP_TEXT_LEN: usize = 45;

/// Longest User-Agent kept for audit purposes
const MAX_USER_AGENT_LEN: usize = 512;

/// Client identity attributes used for rate limiting and audit context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    /// Resolved client IP address
    pub ip: Option<IpAddr>,
    /// User-Agent header (truncated)
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Resolve client attributes from request headers
    pub fn from_headers(headers: &HeaderMap, direct_ip: Option<IpAddr>, trust_proxy: bool) -> Self {
        Self {
            ip: resolve_client_ip(headers, direct_ip, trust_proxy),
            user_agent: extract_user_agent(headers),
        }
    }

    /// Get IP as string (for storage and rate-limit keys)
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}

/// Resolve the client IP address
///
/// With `trust_proxy` disabled the proxy headers are ignored and the direct
/// connection IP is returned. Otherwise candidates are tried in order:
/// `CF-Connecting-IP`, `X-Real-IP`, the leftmost `X-Forwarded-For` entry.
/// Malformed candidates are skipped; when none is valid the direct IP wins.
pub fn resolve_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trust_proxy: bool,
) -> Option<IpAddr> {
    if !trust_proxy {
        return direct_ip;
    }

    let forwarded_for = header_str(headers, X_FORWARDED_FOR)
        .and_then(|xff| xff.split(',').next());

    let candidates = [
        header_str(headers, CF_CONNECTING_IP),
        header_str(headers, X_REAL_IP),
        forwarded_for,
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(|candidate| {
            let parsed = parse_ip_candidate(candidate);
            if parsed.is_none() {
                tracing::debug!("Skipping malformed proxy IP candidate");
            }
            parsed
        })
        .or(direct_ip)
}

/// Strictly parse a single IPv4/IPv6 textual address
///
/// Ports, brackets, zone ids and surrounding garbage are rejected.
pub fn parse_ip_candidate(raw: &str) -> Option<IpAddr> {
    let candidate = raw.trim();
    if candidate.is_empty() || candidate.len() > MAX_IP_TEXT_LEN {
        return None;
    }
    candidate.parse::<IpAddr>().ok()
}

/// Extract the User-Agent header, truncated on a char boundary
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ua| !ua.is_empty())?;

    Some(user_agent.chars().take(MAX_USER_AGENT_LEN).collect())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn direct() -> Option<IpAddr> {
        Some("10.0.0.9".parse().unwrap())
    }

    #[test]
    fn test_untrusted_proxy_headers_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("1.2.3.4"));
        headers.insert(CF_CONNECTING_IP, HeaderValue::from_static("5.6.7.8"));
        headers.insert(X_REAL_IP, HeaderValue::from_static("9.9.9.9"));

        assert_eq!(resolve_client_ip(&headers, direct(), false), direct());
    }

    #[test]
    fn test_cf_connecting_ip_takes_priority() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("1.2.3.4, 10.0.0.1"));
        headers.insert(CF_CONNECTING_IP, HeaderValue::from_static("5.6.7.8"));

        let ip = resolve_client_ip(&headers, direct(), true);
        assert_eq!(ip, Some("5.6.7.8".parse().unwrap()));
    }

    #[test]
    fn test_malformed_candidate_is_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert(CF_CONNECTING_IP, HeaderValue::from_static("not-an-ip"));
        headers.insert(X_REAL_IP, HeaderValue::from_static("2001:db8::1"));
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("1.2.3.4"));

        let ip = resolve_client_ip(&headers, direct(), true);
        assert_eq!(ip, Some("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn test_leftmost_forwarded_for_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static(" 192.168.1.1 , 10.0.0.1"),
        );

        let ip = resolve_client_ip(&headers, None, true);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_all_invalid_falls_back_to_direct() {
        let mut headers = HeaderMap::new();
        headers.insert(CF_CONNECTING_IP, HeaderValue::from_static("999.1.1.1"));
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("1.2.3.4:8080"));

        assert_eq!(resolve_client_ip(&headers, direct(), true), direct());
    }

    #[test]
    fn test_parse_ip_candidate_is_strict() {
        assert!(parse_ip_candidate("127.0.0.1").is_some());
        assert!(parse_ip_candidate("::1").is_some());
        assert!(parse_ip_candidate("[::1]").is_none());
        assert!(parse_ip_candidate("1.2.3").is_none());
        assert!(parse_ip_candidate("01.2.3.4").is_none());
        assert!(parse_ip_candidate("fe80::1%eth0").is_none());
        assert!(parse_ip_candidate("").is_none());
    }

    #[test]
    fn test_extract_user_agent_truncates() {
        let mut headers = HeaderMap::new();
        let long = "a".repeat(600);
        headers.insert(header::USER_AGENT, HeaderValue::from_str(&long).unwrap());

        let ua = extract_user_agent(&headers).unwrap();
        assert_eq!(ua.len(), MAX_USER_AGENT_LEN);
    }

    #[test]
    fn test_client_info_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0 Test"));

        let info = ClientInfo::from_headers(&headers, direct(), false);
        assert_eq!(info.ip_string(), Some("10.0.0.9".to_string()));
        assert_eq!(info.user_agent.as_deref(), Some("Mozilla/5.0 Test"));
    }
}
