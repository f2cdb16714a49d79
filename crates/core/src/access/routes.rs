//! Route classification.

/// Login page.
pub const LOGIN_PATH: &str = "/login";
/// Registration page.
pub const REGISTER_PATH: &str = "/register";
/// Onboarding flow.
pub const ONBOARDING_PATH: &str = "/onboarding";
/// Landing page of the protected area.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Query parameter carrying the path a bounced request originally asked for.
pub const REDIRECT_PARAM: &str = "redirect";

/// Category of a request path. Every path falls into exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    /// Anything the guard does not run for.
    Public,
    /// `/login` and `/register`.
    AuthPage,
    /// `/onboarding` and below.
    Onboarding,
    /// `/dashboard` and below.
    Protected,
}

impl RouteClass {
    /// Classify a request path (without query string).
    #[must_use]
    pub fn classify(path: &str) -> Self {
        if is_under(path, DASHBOARD_PATH) {
            Self::Protected
        } else if is_under(path, ONBOARDING_PATH) {
            Self::Onboarding
        } else if is_under(path, LOGIN_PATH) || is_under(path, REGISTER_PATH) {
            Self::AuthPage
        } else {
            Self::Public
        }
    }

    /// Whether the guard runs for this class at all.
    #[must_use]
    pub const fn is_guarded(self) -> bool {
        !matches!(self, Self::Public)
    }

    /// Whether an unauthenticated caller is bounced to the login page.
    #[must_use]
    pub const fn requires_identity(self) -> bool {
        matches!(self, Self::Protected | Self::Onboarding)
    }
}

/// Segment-aware prefix match: `/dashboard` matches `/dashboard` and
/// `/dashboard/courses` but not `/dashboards`.
fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Accept a post-login return path only if it stays on this site.
///
/// Rejects absolute URLs, protocol-relative `//host` paths, backslashes (which
/// some browsers treat as `/`) and control characters.
#[must_use]
pub fn sanitize_return_to(raw: &str) -> Option<&str> {
    let safe = raw.starts_with('/')
        && !raw.starts_with("//")
        && !raw.contains('\\')
        && !raw.chars().any(char::is_control);

    safe.then_some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_protected() {
        assert_eq!(RouteClass::classify("/dashboard"), RouteClass::Protected);
        assert_eq!(RouteClass::classify("/dashboard/"), RouteClass::Protected);
        assert_eq!(
            RouteClass::classify("/dashboard/students/42"),
            RouteClass::Protected
        );
    }

    #[test]
    fn test_classify_onboarding_and_auth_pages() {
        assert_eq!(RouteClass::classify("/onboarding"), RouteClass::Onboarding);
        assert_eq!(
            RouteClass::classify("/onboarding/step-2"),
            RouteClass::Onboarding
        );
        assert_eq!(RouteClass::classify("/login"), RouteClass::AuthPage);
        assert_eq!(RouteClass::classify("/register"), RouteClass::AuthPage);
    }

    #[test]
    fn test_classify_public() {
        for path in ["/", "/about", "/dashboards", "/loginx", "/api/onboarding/status", "/health"] {
            assert_eq!(RouteClass::classify(path), RouteClass::Public, "{path}");
            assert!(!RouteClass::classify(path).is_guarded());
        }
    }

    #[test]
    fn test_requires_identity() {
        assert!(RouteClass::Protected.requires_identity());
        assert!(RouteClass::Onboarding.requires_identity());
        assert!(!RouteClass::AuthPage.requires_identity());
        assert!(!RouteClass::Public.requires_identity());
    }

    #[test]
    fn test_sanitize_return_to() {
        assert_eq!(
            sanitize_return_to("/dashboard/students/42"),
            Some("/dashboard/students/42")
        );
        assert_eq!(sanitize_return_to("https://evil.example/"), None);
        assert_eq!(sanitize_return_to("//evil.example/"), None);
        assert_eq!(sanitize_return_to("/\\evil.example"), None);
        assert_eq!(sanitize_return_to("/dash\nboard"), None);
        assert_eq!(sanitize_return_to(""), None);
    }
}
