//! Access extractors and session helpers.
//!
//! The access guard resolves identity and profile once per request and
//! leaves an [`AccessContext`] in the request extensions. These extractors
//! hand it to handlers without another round trip.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use campus_core::access::LOGIN_PATH;

use crate::models::{AuthSession, session_keys};
use crate::services::access::AccessContext;

/// Extractor that requires a resolved caller.
///
/// Only succeeds on routes behind the access guard. Anywhere else, or if the
/// guard did not let the request through with an identity, the caller is sent
/// to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAccess(access): RequireAccess) -> impl IntoResponse {
///     format!("Hello, {}!", access.profile.display_name().unwrap_or_default())
/// }
/// ```
pub struct RequireAccess(pub AccessContext);

/// Rejection for [`RequireAccess`].
pub struct AccessRejection;

impl IntoResponse for AccessRejection {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAccess
where
    S: Send + Sync,
{
    type Rejection = AccessRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AccessContext>()
            .cloned()
            .map(Self)
            .ok_or(AccessRejection)
    }
}

/// Store a freshly issued identity in the session.
///
/// Cycles the session ID first so a pre-login session ID cannot be fixed by
/// an attacker.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_session(
    session: &Session,
    auth: &AuthSession,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::AUTH_SESSION, auth).await
}

/// Drop all session data (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
