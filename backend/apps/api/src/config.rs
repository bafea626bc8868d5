//! Startup Configuration
//!
//! Everything read from the environment at boot. Missing or invalid values
//! abort startup, except in the build phase where infrastructure settings
//! are optional and stubs are used instead.

use std::net::SocketAddr;
use std::time::Duration;

use audit::AuditConfig;
use auth::application::config::SESSION_COOKIE;
use auth::{AuthConfig, UserId};
use guard::GuardConfig;
use platform::config::{
    ConfigError, Environment, env_flag, env_parse, env_var, is_build_phase, require_env,
};
use platform::crypto::SigningSecret;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_STORE_TIMEOUT_MS: u64 = 2000;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub environment: Environment,
    /// `APP_PHASE=build`: serve with stubbed infrastructure
    pub build_phase: bool,
    pub bind_addr: SocketAddr,
    /// Application / audit database
    pub database_url: Option<String>,
    /// Rate limit store database
    pub rate_limit_database_url: Option<String>,
    /// Allowed CORS origins
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    pub guard: GuardConfig,
    pub audit: AuditConfig,
}

impl ApiConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env()?;
        let build_phase = is_build_phase();

        let auth_secret = if build_phase {
            optional_secret("AUTH_SECRET")?.unwrap_or_else(|| {
                tracing::warn!("AUTH_SECRET not set during build phase, using a random secret");
                SigningSecret::random()
            })
        } else {
            required_secret("AUTH_SECRET")?
        };
        let csrf_secret = optional_secret("CSRF_SECRET")?.unwrap_or_else(|| auth_secret.clone());

        let (database_url, rate_limit_database_url) = if build_phase {
            (env_var("DATABASE_URL"), env_var("RATE_LIMIT_DATABASE_URL"))
        } else {
            (
                Some(require_env("DATABASE_URL")?),
                Some(require_env("RATE_LIMIT_DATABASE_URL")?),
            )
        };

        let admin_user_id = env_var("ADMIN_USER_ID")
            .map(|raw| {
                UserId::new(raw).map_err(|e| ConfigError::Invalid {
                    name: "ADMIN_USER_ID",
                    reason: e.to_string(),
                })
            })
            .transpose()?;
        if admin_user_id.is_none() {
            tracing::warn!("ADMIN_USER_ID not set, cross-user operations will be refused");
        }

        let auth = auth_config(environment, auth_secret).with_admin(admin_user_id);

        let guard = GuardConfig {
            environment,
            trust_proxy: env_flag("TRUST_PROXY")?,
            csrf_secret,
            app_origin: app_origin(environment, build_phase, env_var("APP_ORIGIN"))?,
            store_timeout: Duration::from_millis(env_parse(
                "RATE_LIMIT_TIMEOUT_MS",
                DEFAULT_STORE_TIMEOUT_MS,
            )?),
            ..GuardConfig::default()
        };

        let bind_addr = env_parse("BIND_ADDR", parse_default_addr()?)?;
        let frontend_origins = split_origins(
            &env_var("FRONTEND_ORIGINS").unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string()),
        );

        Ok(Self {
            environment,
            build_phase,
            bind_addr,
            database_url,
            rate_limit_database_url,
            frontend_origins,
            auth,
            guard,
            audit: AuditConfig::default(),
        })
    }
}

/// Session settings for an environment
fn auth_config(environment: Environment, secret: SigningSecret) -> AuthConfig {
    if environment.is_production() {
        AuthConfig::production(secret)
    } else {
        AuthConfig {
            session_cookie_name: SESSION_COOKIE.to_string(),
            ..AuthConfig::production(secret)
        }
    }
}

/// Production serves unsafe API requests only with a known origin
fn app_origin(
    environment: Environment,
    build_phase: bool,
    raw: Option<String>,
) -> Result<Option<String>, ConfigError> {
    match raw {
        None if environment.is_production() && !build_phase => {
            Err(ConfigError::Missing("APP_ORIGIN"))
        }
        raw => Ok(raw),
    }
}

fn required_secret(name: &'static str) -> Result<SigningSecret, ConfigError> {
    optional_secret(name)?.ok_or(ConfigError::Missing(name))
}

fn optional_secret(name: &'static str) -> Result<Option<SigningSecret>, ConfigError> {
    env_var(name)
        .map(|raw| {
            SigningSecret::new(raw.into_bytes()).map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_default_addr() -> Result<SocketAddr, ConfigError> {
    DEFAULT_BIND_ADDR.parse().map_err(|_| ConfigError::Invalid {
        name: "BIND_ADDR",
        reason: "default address does not parse".to_string(),
    })
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_by_environment() {
        let prod = auth_config(Environment::Production, SigningSecret::random());
        assert_eq!(prod.session_cookie_name, "__Secure-session-token");
        assert!(prod.session_secret.is_some());

        let dev = auth_config(Environment::Development, SigningSecret::random());
        assert_eq!(dev.session_cookie_name, "session-token");
    }

    #[test]
    fn test_app_origin_required_in_production() {
        assert!(matches!(
            app_origin(Environment::Production, false, None),
            Err(ConfigError::Missing("APP_ORIGIN"))
        ));
        assert_eq!(
            app_origin(Environment::Production, false, Some("https://app.example".into())).unwrap(),
            Some("https://app.example".to_string())
        );
        assert_eq!(app_origin(Environment::Production, true, None).unwrap(), None);
        assert_eq!(app_origin(Environment::Development, false, None).unwrap(), None);
    }

    #[test]
    fn test_split_origins() {
        assert_eq!(
            split_origins(" http://a.example ,, http://b.example:3000 "),
            vec!["http://a.example", "http://b.example:3000"]
        );
    }

    #[test]
    fn test_default_addr() {
        assert_eq!(parse_default_addr().unwrap().port(), 31113);
    }
}
