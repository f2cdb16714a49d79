//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Redirect to /dashboard
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (profile store)
//!
//! # Auth (guarded: signed-in callers are sent on)
//! GET  /login                     - Login page (?redirect= is honoured)
//! POST /login                     - Sign in
//! GET  /register                  - Registration page
//! POST /register                  - Sign up
//! POST /logout                    - Sign out
//!
//! # Onboarding (guarded)
//! GET  /onboarding                - Name form
//! POST /onboarding                - Complete onboarding
//!
//! # Dashboard (guarded)
//! GET  /dashboard                 - Overview
//! GET  /dashboard/{section}/...   - Section gated by capability
//!
//! # API
//! GET  /api/onboarding/status     - { "needsOnboarding": bool }
//! ```

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod onboarding;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use campus_core::access::{DASHBOARD_PATH, LOGIN_PATH, ONBOARDING_PATH, REGISTER_PATH};

use crate::state::AppState;

/// Create the portal page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to(DASHBOARD_PATH) }))
        .route("/health", get(health::live))
        .route("/health/ready", get(health::ready))
        .route(LOGIN_PATH, get(auth::login_page).post(auth::login))
        .route(REGISTER_PATH, get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route(
            ONBOARDING_PATH,
            get(onboarding::page).post(onboarding::submit),
        )
        .route(DASHBOARD_PATH, get(dashboard::index))
        .route("/dashboard/{*rest}", get(dashboard::section))
        .nest("/api", api::routes())
}
