//! Route guard enforcing sign-in and onboarding.
//!
//! Runs for `/dashboard`, `/onboarding`, `/login` and `/register` (and
//! anything below them). Every other path is passed straight through without
//! touching the session or the identity provider.
//!
//! Per request, in order:
//!
//! 1. Mock auth on: auth pages go to the dashboard, everything else passes.
//! 2. Read the cached session and verify its token with the identity provider.
//! 3. No verified principal: protected and onboarding paths go to
//!    `/login?redirect=<path>`, auth pages pass.
//! 4. Fetch the profile. Failure goes to `/login`.
//! 5. Apply the onboarding decision table.
//!
//! Any failure ends in a login redirect; the guard never renders an error.
//! Nothing is retried and nothing is written to the session or profile store.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use campus_core::access::{self, GuardFailure, GuardOutcome, RouteClass};

use crate::services::access::{AccessContext, load_profile, resolve_principal};
use crate::state::AppState;

/// Access guard middleware. Install with
/// `axum::middleware::from_fn_with_state(state, access_guard)` inside the
/// session layer.
pub async fn access_guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let route = RouteClass::classify(&path);

    if !route.is_guarded() {
        return next.run(request).await;
    }

    let (outcome, context) = if state.mock_auth() {
        (access::bypass(route), Some(AccessContext::demo()))
    } else {
        // Clone out of the request so no borrow of the body is held across awaits.
        let session = request.extensions().get::<Session>().cloned();
        match evaluate(&state, session, route, &path).await {
            Ok(decision) => decision,
            Err(failure) => {
                tracing::warn!(path = %path, failure = ?failure, "Access guard failed closed");
                (access::failed(route, &path, failure), None)
            }
        }
    };

    tracing::debug!(path = %path, outcome = outcome.label(), "Access guard decision");

    match outcome.location() {
        None => {
            if let Some(context) = context {
                request.extensions_mut().insert(context);
            }
            next.run(request).await
        }
        Some(location) => Redirect::to(&location).into_response(),
    }
}

/// Steps 2-5 for a guarded route.
async fn evaluate(
    state: &AppState,
    session: Option<Session>,
    route: RouteClass,
    path: &str,
) -> Result<(GuardOutcome, Option<AccessContext>), GuardFailure> {
    let session = session.ok_or_else(|| {
        tracing::error!("Session layer missing in front of access guard");
        GuardFailure::UnexpectedFailure
    })?;

    let Some(principal) = resolve_principal(state.identity(), &session).await? else {
        return Ok((access::unauthenticated(route, path), None));
    };

    let profile = load_profile(state.profiles(), principal.id).await?;
    let outcome = access::authenticated(route, profile.needs_onboarding());

    Ok((outcome, Some(AccessContext::new(&principal, profile))))
}
