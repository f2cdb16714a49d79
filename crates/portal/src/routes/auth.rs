//! Authentication route handlers.
//!
//! Sign-in and sign-up are delegated to the identity provider. On success the
//! issued token is cached in the session, an empty profile row is created if
//! needed, and the caller is sent on. The access guard takes it from there.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;

use campus_core::Email;
use campus_core::access::{
    DASHBOARD_PATH, GuardOutcome, LOGIN_PATH, ONBOARDING_PATH, REGISTER_PATH, sanitize_return_to,
};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_auth_session, set_auth_session};
use crate::models::AuthSession;
use crate::services::access::read_auth_session;
use crate::services::identity::{IdentityError, IdentityGrant};
use crate::state::AppState;

/// Minimum password length accepted by the registration form.
const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters accepted by the auth pages.
#[derive(Debug, Default, Deserialize)]
pub struct AuthPageQuery {
    pub redirect: Option<String>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub redirect: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<AuthPageQuery>) -> impl IntoResponse {
    LoginTemplate {
        redirect: query
            .redirect
            .as_deref()
            .and_then(sanitize_return_to)
            .unwrap_or_default()
            .to_owned(),
        error: query.error.as_deref().map(error_message),
        notice: query.notice.as_deref().and_then(notice_message),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let return_to = form
        .redirect
        .as_deref()
        .and_then(sanitize_return_to)
        .unwrap_or(DASHBOARD_PATH)
        .to_owned();

    let Ok(email) = Email::parse(&form.email) else {
        return login_redirect("email", &return_to);
    };
    let password = SecretString::from(form.password);

    match state.identity().sign_in(&email, &password).await {
        Ok(grant) => {
            if let Err(e) = establish_session(&state, &session, grant).await {
                tracing::error!(error = %e, "Failed to store session after login");
                return login_redirect("session", &return_to);
            }
            Redirect::to(&return_to).into_response()
        }
        Err(IdentityError::InvalidCredentials) => login_redirect("credentials", &return_to),
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            login_redirect("unavailable", &return_to)
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<AuthPageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: query.error.as_deref().map(error_message),
    }
}

/// Handle registration form submission.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let Ok(email) = Email::parse(&form.email) else {
        return register_redirect("email");
    };
    if form.password != form.password_confirm {
        return register_redirect("mismatch");
    }
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        return register_redirect("weak");
    }
    let password = SecretString::from(form.password);

    match state.identity().sign_up(&email, &password).await {
        Ok(grant) => {
            if let Err(e) = establish_session(&state, &session, grant).await {
                tracing::error!(error = %e, "Failed to store session after sign-up");
                return register_redirect("session");
            }
            Redirect::to(ONBOARDING_PATH).into_response()
        }
        Err(IdentityError::ConfirmationRequired) => {
            Redirect::to(&format!("{LOGIN_PATH}?notice=confirm")).into_response()
        }
        Err(IdentityError::Rejected(reason)) => {
            tracing::info!(reason = %reason, "Sign-up rejected");
            register_redirect("rejected")
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign-up failed");
            register_redirect("unavailable")
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out: revoke the token (best effort) and drop the session.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(auth)) = read_auth_session(&session).await
        && let Err(e) = state.identity().sign_out(&auth.access_token).await
    {
        tracing::warn!(error = %e, "Token revocation failed during logout");
    }

    if let Err(e) = clear_auth_session(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();

    Redirect::to(LOGIN_PATH).into_response()
}

// =============================================================================
// Helpers
// =============================================================================

/// Cache the grant in the session and make sure a profile row exists.
async fn establish_session(
    state: &AppState,
    session: &Session,
    grant: IdentityGrant,
) -> Result<(), tower_sessions::session::Error> {
    let principal = grant.principal;

    set_auth_session(
        session,
        &AuthSession {
            principal_id: principal.id,
            access_token: grant.access_token,
        },
    )
    .await?;

    // A missing row is not fatal: the guard treats it as "needs onboarding"
    // and onboarding upserts it.
    if let Err(e) = state.profiles().ensure(principal.id).await {
        tracing::warn!(error = %e, principal_id = %principal.id, "Failed to create profile row");
    }

    set_sentry_user(&principal.id, principal.email.as_deref());
    tracing::info!(principal_id = %principal.id, "Signed in");
    Ok(())
}

fn login_redirect(error: &str, return_to: &str) -> Response {
    let return_to = (return_to != DASHBOARD_PATH).then(|| return_to.to_owned());
    let base = GuardOutcome::RedirectLogin { return_to }
        .location()
        .unwrap_or_else(|| LOGIN_PATH.to_owned());
    let separator = if base.contains('?') { '&' } else { '?' };
    Redirect::to(&format!("{base}{separator}error={error}")).into_response()
}

fn register_redirect(error: &str) -> Response {
    Redirect::to(&format!("{REGISTER_PATH}?error={error}")).into_response()
}

fn error_message(code: &str) -> String {
    match code {
        "credentials" => "Incorrect email or password.",
        "email" => "Please enter a valid email address.",
        "mismatch" => "The passwords do not match.",
        "weak" => "Passwords must be at least 8 characters long.",
        "rejected" => "That email address cannot be registered.",
        "session" => "We could not start your session. Please try again.",
        _ => "Sign-in is temporarily unavailable. Please try again.",
    }
    .to_owned()
}

fn notice_message(code: &str) -> Option<String> {
    match code {
        "confirm" => Some("Check your inbox to confirm your email address, then sign in.".to_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[test]
    fn test_login_redirect_keeps_return_path() {
        let response = login_redirect("credentials", "/dashboard/students/42");
        assert_eq!(
            location(&response),
            "/login?redirect=/dashboard/students/42&error=credentials"
        );
    }

    #[test]
    fn test_login_redirect_omits_default_target() {
        let response = login_redirect("credentials", DASHBOARD_PATH);
        assert_eq!(location(&response), "/login?error=credentials");
    }

    #[test]
    fn test_unknown_error_code_is_generic() {
        assert_eq!(
            error_message("<script>"),
            "Sign-in is temporarily unavailable. Please try again."
        );
    }

    #[test]
    fn test_unknown_notice_is_dropped() {
        assert!(notice_message("confirm").is_some());
        assert!(notice_message("anything").is_none());
    }

    #[test]
    fn test_login_template_renders_sanitized_redirect() {
        let html = LoginTemplate {
            redirect: "/dashboard/courses".to_owned(),
            error: Some(error_message("credentials")),
            notice: None,
        }
        .render()
        .unwrap_or_default();

        assert!(html.contains("dashboard"));
        assert!(html.contains("Incorrect email or password."));
    }
}
