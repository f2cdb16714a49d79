//! JSON API routes.

pub mod onboarding;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the API router (mounted under `/api`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/onboarding/status", get(onboarding::status))
}
