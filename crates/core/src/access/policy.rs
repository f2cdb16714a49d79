//! Guard decision table.

use thiserror::Error;

use super::routes::{DASHBOARD_PATH, LOGIN_PATH, ONBOARDING_PATH, REDIRECT_PARAM, RouteClass};

/// Terminal result of one guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Let the request through unchanged.
    Allow,
    /// Send the caller to the login page, optionally remembering where they
    /// were headed.
    RedirectLogin { return_to: Option<String> },
    RedirectOnboarding,
    RedirectDashboard,
}

impl GuardOutcome {
    /// Redirect target, or `None` for [`GuardOutcome::Allow`].
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::RedirectLogin { return_to: None } => Some(LOGIN_PATH.to_owned()),
            Self::RedirectLogin {
                return_to: Some(path),
            } => Some(format!(
                "{LOGIN_PATH}?{REDIRECT_PARAM}={}",
                encode_return_path(path)
            )),
            Self::RedirectOnboarding => Some(ONBOARDING_PATH.to_owned()),
            Self::RedirectDashboard => Some(DASHBOARD_PATH.to_owned()),
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::RedirectLogin { .. } => "redirect_login",
            Self::RedirectOnboarding => "redirect_onboarding",
            Self::RedirectDashboard => "redirect_dashboard",
        }
    }
}

/// Why the guard could not establish identity or profile state.
///
/// All three end in a login redirect. They are kept apart only for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardFailure {
    /// Session or principal read failed, was empty, or the two disagreed.
    #[error("identity unavailable")]
    IdentityUnavailable,
    /// The principal is verified but its profile could not be read.
    #[error("profile fetch failed")]
    ProfileFetchFailed,
    /// Anything else (missing session layer, session store error, ...).
    #[error("unexpected failure")]
    UnexpectedFailure,
}

/// Step 1: mock-auth mode. No identity calls are made.
#[must_use]
pub const fn bypass(route: RouteClass) -> GuardOutcome {
    match route {
        RouteClass::AuthPage => GuardOutcome::RedirectDashboard,
        RouteClass::Public | RouteClass::Onboarding | RouteClass::Protected => GuardOutcome::Allow,
    }
}

/// Step 3: no verified principal.
#[must_use]
pub fn unauthenticated(route: RouteClass, path: &str) -> GuardOutcome {
    if route.requires_identity() {
        GuardOutcome::RedirectLogin {
            return_to: Some(path.to_owned()),
        }
    } else {
        GuardOutcome::Allow
    }
}

/// Step 5: verified principal with a loaded profile.
#[must_use]
pub const fn authenticated(route: RouteClass, needs_onboarding: bool) -> GuardOutcome {
    match (route, needs_onboarding) {
        (RouteClass::Public, _) | (RouteClass::Onboarding, true) | (RouteClass::Protected, false) => {
            GuardOutcome::Allow
        }
        (RouteClass::AuthPage | RouteClass::Protected, true) => GuardOutcome::RedirectOnboarding,
        (RouteClass::AuthPage | RouteClass::Onboarding, false) => GuardOutcome::RedirectDashboard,
    }
}

/// Steps 4 and 6: fail closed.
///
/// Identity failures behave exactly like an anonymous request. Profile and
/// unexpected failures send the caller to a bare login page, except when the
/// request already targets an auth page, which is let through so the bounce
/// cannot loop.
#[must_use]
pub fn failed(route: RouteClass, path: &str, failure: GuardFailure) -> GuardOutcome {
    match failure {
        GuardFailure::IdentityUnavailable => unauthenticated(route, path),
        GuardFailure::ProfileFetchFailed | GuardFailure::UnexpectedFailure => match route {
            RouteClass::Public | RouteClass::AuthPage => GuardOutcome::Allow,
            RouteClass::Onboarding | RouteClass::Protected => {
                GuardOutcome::RedirectLogin { return_to: None }
            }
        },
    }
}

/// Percent-encode a path for the `redirect` query value, leaving `/` readable.
fn encode_return_path(path: &str) -> String {
    urlencoding::encode(path).replace("%2F", "/")
}
