//! Route Matching
//!
//! Prefix matching is segment-bounded: `/api/users` matches `/api/users` and
//! `/api/users/xyz`, never `/api/usersettings`. A trailing `/*` on a pattern
//! is accepted and means the same thing.

use axum::http::Method;

/// Whether `path` falls under `prefix`
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches("/*").trim_end_matches('/');
    if prefix.is_empty() {
        return path.starts_with('/');
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Whether `path` falls under any of `prefixes`
pub fn matches_any(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| path_has_prefix(path, p))
}

/// GET, HEAD and OPTIONS
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Sign-in location carrying the original path and query as `callbackUrl`
pub fn sign_in_location(sign_in: &str, path_and_query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(path_and_query.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("{sign_in}?callbackUrl={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_segment_bounded() {
        assert!(path_has_prefix("/api/users", "/api/users"));
        assert!(path_has_prefix("/api/users/xyz/erase", "/api/users"));
        assert!(!path_has_prefix("/api/usersettings", "/api/users"));
        assert!(!path_has_prefix("/dashboardx", "/dashboard"));
        assert!(path_has_prefix("/api/test/reset", "/api/test/*"));
        assert!(path_has_prefix("/api/test", "/api/test/*"));
        assert!(path_has_prefix("/anything", "/"));
    }

    #[test]
    fn test_safe_methods() {
        assert!(is_safe_method(&Method::GET));
        assert!(is_safe_method(&Method::HEAD));
        assert!(is_safe_method(&Method::OPTIONS));
        assert!(!is_safe_method(&Method::POST));
        assert!(!is_safe_method(&Method::DELETE));
        assert!(!is_safe_method(&Method::TRACE));
    }

    #[test]
    fn test_sign_in_location_encodes_callback() {
        assert_eq!(
            sign_in_location("/sign-in", "/dashboard"),
            "/sign-in?callbackUrl=%2Fdashboard"
        );
        assert_eq!(
            sign_in_location("/sign-in", "/documents/1?tab=a b&x=1"),
            "/sign-in?callbackUrl=%2Fdocuments%2F1%3Ftab%3Da%20b%26x%3D1"
        );
    }
}
