//! Environment Configuration Helpers
//!
//! Thin, typed accessors over process environment variables.
//! Parsing is split from lookup so it can be tested without touching
//! the process environment.

use std::str::FromStr;

/// Recognized deployment environments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    Development,
    Test,
}

impl Environment {
    /// Parse `APP_ENV`-style values; unknown values are rejected
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            other => Err(ConfigError::Invalid {
                name: "APP_ENV",
                reason: format!("unknown environment '{other}'"),
            }),
        }
    }

    /// Read `APP_ENV` (defaults to development)
    pub fn from_env() -> Result<Self, ConfigError> {
        env_var("APP_ENV").map_or(Ok(Environment::default()), |raw| Self::parse(&raw))
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Configuration error raised at startup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Whether the process runs in the recognized build phase (`APP_PHASE=build`)
///
/// In that phase infrastructure-backed components are replaced by
/// non-functional stubs instead of refusing to start.
pub fn is_build_phase() -> bool {
    env_var("APP_PHASE").is_some_and(|phase| phase.eq_ignore_ascii_case("build"))
}

/// Read a non-empty, trimmed environment variable
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a required environment variable
pub fn require_env(name: &'static str) -> Result<String, ConfigError> {
    env_var(name).ok_or(ConfigError::Missing(name))
}

/// Read a boolean flag (`true`/`1`/`yes`/`on`); absent means `false`
pub fn env_flag(name: &'static str) -> Result<bool, ConfigError> {
    env_var(name).map_or(Ok(false), |raw| parse_flag(name, &raw))
}

/// Read and parse an environment variable, falling back to `default`
pub fn env_parse<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parse a boolean flag value
pub fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}
