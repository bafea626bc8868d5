//! Application Configuration
//!
//! Configuration for the request pipeline: route classes, CSRF cookie,
//! rate limit rules and the store timeout.

use std::net::IpAddr;
use std::time::Duration;

use platform::config::Environment;
use platform::cookie::{CookieConfig, SameSite};
use platform::crypto::SigningSecret;
use platform::rate_limit::RateLimitConfig;

use crate::domain::route::{matches_any, path_has_prefix};

/// CSRF cookie name in production (`__Host-` requires Secure, Path=/, no Domain)
pub const HOST_CSRF_COOKIE: &str = "__Host-csrf-token";
/// CSRF cookie name outside production
pub const CSRF_COOKIE: &str = "csrf-token";
/// Header the client echoes the CSRF token in
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Route classification
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    /// Prefix of API routes
    pub api_prefix: String,
    /// API routes that skip CSRF and rate limiting
    pub csrf_exempt: Vec<String>,
    /// Routes that require a session
    pub protected: Vec<String>,
    /// Routes only for signed-out callers
    pub auth_only: Vec<String>,
    /// Where unauthenticated page requests are sent
    pub sign_in: String,
    /// Where signed-in callers of auth-only routes are sent
    pub landing: String,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            csrf_exempt: vec![
                "/api/health".to_string(),
                "/api/auth/session".to_string(),
                "/api/test/*".to_string(),
            ],
            protected: vec![
                "/dashboard".to_string(),
                "/documents".to_string(),
                "/settings".to_string(),
                "/api/users".to_string(),
                "/api/documents".to_string(),
            ],
            auth_only: vec![
                "/sign-in".to_string(),
                "/sign-up".to_string(),
                "/forgot-password".to_string(),
            ],
            sign_in: "/sign-in".to_string(),
            landing: "/dashboard".to_string(),
        }
    }
}

impl RoutePolicy {
    pub fn is_api(&self, path: &str) -> bool {
        path_has_prefix(path, &self.api_prefix)
    }

    pub fn is_csrf_exempt(&self, path: &str) -> bool {
        matches_any(path, &self.csrf_exempt)
    }

    pub fn is_protected(&self, path: &str) -> bool {
        matches_any(path, &self.protected)
    }

    pub fn is_auth_only(&self, path: &str) -> bool {
        matches_any(path, &self.auth_only)
    }

    /// API route subject to CSRF and rate limiting
    pub fn is_guarded_api(&self, path: &str) -> bool {
        self.is_api(path) && !self.is_csrf_exempt(path)
    }
}

/// Rate limit for one endpoint class
#[derive(Debug, Clone)]
pub struct RateLimitRule {
    /// Class name, used as the key namespace
    pub class: String,
    /// Routes in this class; empty matches every guarded API route
    pub prefixes: Vec<String>,
    pub limit: RateLimitConfig,
}

impl RateLimitRule {
    /// Credential-mutation endpoints: 5 per 10 minutes
    pub fn credential() -> Self {
        Self {
            class: "credential".to_string(),
            prefixes: vec![
                "/api/auth/password".to_string(),
                "/api/auth/reset-password".to_string(),
                "/api/auth/forgot-password".to_string(),
            ],
            limit: RateLimitConfig::new(5, 600),
        }
    }

    /// Every other guarded API route: 10 per minute
    pub fn general() -> Self {
        Self {
            class: "general".to_string(),
            prefixes: Vec::new(),
            limit: RateLimitConfig::new(10, 60),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.prefixes.is_empty() || matches_any(path, &self.prefixes)
    }

    /// Store key for a client
    pub fn identifier(&self, ip: Option<IpAddr>) -> String {
        match ip {
            Some(ip) => format!("{}:{}", self.class, ip),
            None => format!("{}:unknown", self.class),
        }
    }
}

/// Guard configuration
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub environment: Environment,
    /// Honor proxy headers for client IP and host
    pub trust_proxy: bool,
    /// CSRF signing secret
    pub csrf_secret: SigningSecret,
    /// Expected origin (`scheme://host[:port]`); `None` compares against Host
    pub app_origin: Option<String>,
    /// CSRF cookie lifetime
    pub csrf_cookie_max_age: Duration,
    pub routes: RoutePolicy,
    /// First matching rule wins
    pub rate_limits: Vec<RateLimitRule>,
    /// Upper bound on one rate limit store call
    pub store_timeout: Duration,
    /// How often expired rate limit slots are purged
    pub window_sweep_interval: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            trust_proxy: false,
            csrf_secret: SigningSecret::random(),
            app_origin: None,
            csrf_cookie_max_age: Duration::from_secs(24 * 3600), // 1 day
            routes: RoutePolicy::default(),
            rate_limits: vec![RateLimitRule::credential(), RateLimitRule::general()],
            store_timeout: Duration::from_secs(2),
            window_sweep_interval: Duration::from_secs(300),
        }
    }
}

impl GuardConfig {
    /// Create config for development (plain cookie name, no Secure)
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            ..Default::default()
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// Rule applying to a guarded API path
    pub fn rate_limit_rule(&self, path: &str) -> Option<&RateLimitRule> {
        self.rate_limits.iter().find(|rule| rule.matches(path))
    }

    /// CSRF cookie settings (readable by scripts so they can echo it)
    pub fn csrf_cookie(&self) -> CookieConfig {
        let production = self.is_production();
        CookieConfig {
            name: if production { HOST_CSRF_COOKIE } else { CSRF_COOKIE }.to_string(),
            secure: production,
            http_only: false,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age_secs: Some(self.csrf_cookie_max_age.as_secs() as i64),
        }
    }
}
