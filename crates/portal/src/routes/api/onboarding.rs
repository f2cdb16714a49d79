//! Onboarding-status query for client-side checks.
//!
//! Resolves the caller exactly like the access guard and answers with the
//! same predicate, so a client that polls this endpoint and the server-side
//! guard always agree about where the user belongs.

use axum::{Json, extract::State};
use serde::Serialize;
use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::services::access::{AccessContext, load_profile, resolve_principal};
use crate::state::AppState;

/// Response body of `GET /api/onboarding/status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatus {
    pub needs_onboarding: bool,
}

/// Report whether the signed-in caller still has to complete onboarding.
///
/// # Errors
///
/// - 401 if there is no verified principal behind the session
/// - 500 if the profile cannot be read
pub async fn status(State(state): State<AppState>, session: Session) -> Result<Json<OnboardingStatus>> {
    if state.mock_auth() {
        return Ok(Json(OnboardingStatus {
            needs_onboarding: AccessContext::demo().needs_onboarding(),
        }));
    }

    let principal = resolve_principal(state.identity(), &session)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| AppError::Unauthorized("not signed in".to_string()))?;

    let profile = load_profile(state.profiles(), principal.id)
        .await
        .map_err(|failure| AppError::Internal(failure.to_string()))?;

    Ok(Json(OnboardingStatus {
        needs_onboarding: profile.needs_onboarding(),
    }))
}
