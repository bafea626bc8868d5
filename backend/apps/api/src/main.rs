//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;
mod dto;
mod error;
mod handlers;
mod router;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use audit::{AuditContextStore, DashMapContextStore, PgAuditRepository, spawn_context_sweeper};
use auth::SessionValidator;
use axum::http::{self, HeaderName, Method, header};
use guard::{
    DisabledRateLimitStore, GuardState, PgRateLimitStore, RateLimitBackend, spawn_window_sweeper,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;
use crate::handlers::ApiState;
use crate::router::api_router;

static MIGRATOR: Migrator = sqlx::migrate!("../../../database/migrations");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,guard=info,auth=info,audit=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env().context("Invalid configuration")?;
    if config.build_phase {
        tracing::warn!("Build phase: rate limiting disabled, requests to limited routes will be refused");
    }

    // Databases
    let pool = connect(config.database_url.as_deref(), "application").await?;
    let rate_limit_pool = match config.rate_limit_database_url.as_deref() {
        Some(url) if Some(url) == config.database_url.as_deref() => Some(pool.clone()),
        Some(url) => Some(connect(Some(url), "rate limit").await?),
        None => None,
    };

    if !config.build_phase {
        MIGRATOR.run(&pool).await?;
        if let Some(rate_limit_pool) = &rate_limit_pool {
            MIGRATOR.run(rate_limit_pool).await?;
        }
        tracing::info!("Migrations completed");
    }

    // Rate limit store; the sweeper's first pass clears windows left from earlier runs
    let rate_limit_store = Arc::new(match rate_limit_pool {
        Some(pool) => RateLimitBackend::Postgres(PgRateLimitStore::new(pool)),
        None => RateLimitBackend::Disabled(DisabledRateLimitStore),
    });
    tracing::info!(backend = rate_limit_store.name(), "Rate limit store ready");
    let window_sweeper = matches!(*rate_limit_store, RateLimitBackend::Postgres(_)).then(|| {
        spawn_window_sweeper(rate_limit_store.clone(), config.guard.window_sweep_interval)
    });

    // Audit context
    let contexts: Arc<dyn AuditContextStore> = Arc::new(DashMapContextStore::new());
    let sweeper = spawn_context_sweeper(
        contexts.clone(),
        config.audit.sweep_interval,
        config.audit.max_context_age,
    );

    let auth_config = Arc::new(config.auth);
    let guard_state = Arc::new(GuardState::new(
        config.guard,
        rate_limit_store,
        SessionValidator::new(auth_config.clone()),
        contexts.clone(),
    ));
    let api_state = ApiState::new(
        auth_config,
        Arc::new(PgAuditRepository::new(pool)),
        contexts,
    );

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("x-csrf-token"),
        ]))
        .allow_credentials(true);

    // Build router
    let app = api_router(api_state, guard_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    if let Some(window_sweeper) = window_sweeper {
        window_sweeper.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

/// Connect a pool; without a URL (build phase) the pool is lazy and never dials
async fn connect(url: Option<&str>, purpose: &'static str) -> anyhow::Result<PgPool> {
    let options = PgPoolOptions::new().max_connections(5);
    let pool = match url {
        Some(url) => options
            .connect(url)
            .await
            .with_context(|| format!("Failed to connect to the {purpose} database"))?,
        None => options.connect_lazy_with(PgConnectOptions::new()),
    };
    tracing::info!(purpose, lazy = url.is_none(), "Database pool ready");
    Ok(pool)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
