//! Onboarding route handlers.
//!
//! The guard only lets callers that still need onboarding reach these
//! handlers. `page` re-checks anyway so a stale tab lands on the dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use campus_core::access::{DASHBOARD_PATH, ONBOARDING_PATH};

use crate::error::Result;
use crate::middleware::RequireAccess;
use crate::state::AppState;

/// Longest accepted first or last name, in characters.
const MAX_NAME_LENGTH: usize = 100;

/// Onboarding form data.
#[derive(Deserialize)]
pub struct OnboardingForm {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OnboardingQuery {
    pub error: Option<String>,
}

/// Onboarding page template.
#[derive(Template, WebTemplate)]
#[template(path = "onboarding.html")]
pub struct OnboardingTemplate {
    pub first_name: String,
    pub last_name: String,
    pub error: Option<String>,
}

/// Display the onboarding form, prefilled with whatever the profile has.
pub async fn page(
    RequireAccess(access): RequireAccess,
    Query(query): Query<OnboardingQuery>,
) -> Response {
    if !access.needs_onboarding() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    let profile = access.profile;
    OnboardingTemplate {
        first_name: profile.first_name.unwrap_or_default(),
        last_name: profile.last_name.unwrap_or_default(),
        error: query
            .error
            .is_some()
            .then(|| "Please enter your first and last name.".to_owned()),
    }
    .into_response()
}

/// Store the caller's names and complete onboarding.
pub async fn submit(
    State(state): State<AppState>,
    RequireAccess(access): RequireAccess,
    Form(form): Form<OnboardingForm>,
) -> Result<Response> {
    let (Some(first_name), Some(last_name)) =
        (clean_name(&form.first_name), clean_name(&form.last_name))
    else {
        return Ok(Redirect::to(&format!("{ONBOARDING_PATH}?error=names")).into_response());
    };

    if state.mock_auth() {
        tracing::debug!("Mock auth enabled, skipping onboarding write");
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    let profile = state
        .profiles()
        .complete_onboarding(access.principal, first_name, last_name)
        .await?;

    tracing::info!(principal_id = %profile.principal_id, "Onboarding completed");
    Ok(Redirect::to(DASHBOARD_PATH).into_response())
}

/// Trim a submitted name, rejecting empty or oversized values.
fn clean_name(raw: &str) -> Option<&str> {
    let name = raw.trim();
    (!name.is_empty() && name.chars().count() <= MAX_NAME_LENGTH).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name_trims() {
        assert_eq!(clean_name("  Ada "), Some("Ada"));
    }

    #[test]
    fn test_clean_name_rejects_blank() {
        assert_eq!(clean_name(""), None);
        assert_eq!(clean_name(" \t "), None);
    }

    #[test]
    fn test_clean_name_length_limit() {
        let exact = "a".repeat(MAX_NAME_LENGTH);
        assert_eq!(clean_name(&exact), Some(exact.as_str()));
        assert_eq!(clean_name(&"a".repeat(MAX_NAME_LENGTH + 1)), None);
    }
}
