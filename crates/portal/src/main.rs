//! Campus Portal - student management web front.
//!
//! This binary serves the portal on port 3000 by default.
//!
//! # Architecture
//!
//! - Axum web framework, Askama templates for server-side rendering
//! - Hosted identity service (GoTrue-compatible) for accounts and tokens
//! - `PostgreSQL` for profiles and sessions
//! - One access guard deciding login, onboarding and dashboard redirects

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_portal::config::PortalConfig;
use campus_portal::db::{self, ProfileRepository};
use campus_portal::middleware::create_session_layer;
use campus_portal::services::identity::GoTrueClient;
use campus_portal::state::AppState;

/// Set up Sentry (when a DSN is configured) and the tracing subscriber.
///
/// The returned guard flushes pending Sentry events on drop, so `main` holds
/// it until exit.
fn init_telemetry(config: &PortalConfig) -> Option<sentry::ClientInitGuard> {
    let sentry_guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: config.sentry_environment.clone().map(Into::into),
                attach_stacktrace: true,
                send_default_pii: false,
                ..Default::default()
            },
        ))
    });

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campus_portal=info,tower_http=debug".into());

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = json_logs.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json_logs).then(tracing_subscriber::fmt::layer);

    // Warnings and errors become Sentry events; info and debug ride along as
    // breadcrumbs.
    let sentry_layer = sentry_tracing::layer().event_filter(|metadata| match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_layer)
        .init();

    if sentry_guard.is_some() {
        tracing::info!("Sentry initialized");
    }
    sentry_guard
}

#[tokio::main]
async fn main() {
    let config = PortalConfig::from_env().expect("Failed to load configuration");
    let _sentry_guard = init_telemetry(&config);

    if config.mock_auth {
        tracing::warn!(
            "CAMPUS_MOCK_AUTH is enabled: every request runs as the demo admin. Never use this in production"
        );
    }

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p campus-cli -- migrate

    let identity = GoTrueClient::new(&config.identity).expect("Failed to build identity client");
    let profiles = ProfileRepository::new(pool.clone());
    let session_layer = create_session_layer(&pool, &config);

    let state = AppState::new(config.clone(), Arc::new(identity), Arc::new(profiles));

    let app = campus_portal::build_router(state, session_layer)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("portal listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
