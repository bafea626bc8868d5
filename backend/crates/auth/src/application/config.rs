//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::crypto::SigningSecret;

use crate::domain::value_object::user_id::UserId;

/// Session cookie name outside production
pub const SESSION_COOKIE: &str = "session-token";
/// Session cookie name in production (`__Secure-` prefix requires HTTPS)
pub const SECURE_SESSION_COOKIE: &str = "__Secure-session-token";
/// Legacy alias still accepted on read
pub const LEGACY_SESSION_COOKIE: &str = "auth_session";

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Current session cookie name
    pub session_cookie_name: String,
    /// Legacy session cookie name (read only)
    pub legacy_cookie_name: String,
    /// Session signing secret; `None` means every token is rejected
    pub session_secret: Option<SigningSecret>,
    /// Lifetime of newly issued session tokens
    pub session_ttl: Duration,
    /// Identity allowed to operate on other users
    pub admin_user_id: Option<UserId>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: SECURE_SESSION_COOKIE.to_string(),
            legacy_cookie_name: LEGACY_SESSION_COOKIE.to_string(),
            session_secret: None,
            session_ttl: Duration::from_secs(12 * 3600), // 12 hours
            admin_user_id: None,
        }
    }
}

impl AuthConfig {
    /// Production configuration with the given secret
    pub fn production(secret: SigningSecret) -> Self {
        Self {
            session_secret: Some(secret),
            ..Default::default()
        }
    }

    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            session_secret: Some(SigningSecret::random()),
            ..Default::default()
        }
    }

    /// Plain cookie name, random secret
    pub fn development() -> Self {
        Self {
            session_cookie_name: SESSION_COOKIE.to_string(),
            ..Self::with_random_secret()
        }
    }

    /// Set the admin identity
    pub fn with_admin(mut self, admin_user_id: Option<UserId>) -> Self {
        self.admin_user_id = admin_user_id;
        self
    }

    /// Get session TTL in milliseconds
    pub fn session_ttl_ms(&self) -> i64 {
        self.session_ttl.as_millis() as i64
    }
}
