//! Application profile of a principal.

use serde::{Deserialize, Serialize};

use super::{CapabilitySet, PrincipalId, Role};

/// Onboarding and role data for a principal.
///
/// Created for a principal the first time they authenticate and filled in by
/// the onboarding flow. The access guard only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub principal_id: PrincipalId,
    pub onboarding_completed: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
}

impl Profile {
    /// Profile of a principal that has no row in the profile store yet.
    #[must_use]
    pub const fn blank(principal_id: PrincipalId) -> Self {
        Self {
            principal_id,
            onboarding_completed: false,
            first_name: None,
            last_name: None,
            role: Role::Student,
        }
    }

    /// Whether the principal must finish onboarding before using the dashboard.
    ///
    /// This is the only implementation of the rule. The access guard, the
    /// onboarding page and the onboarding-status API all call it, so a client
    /// check and the server-side guard cannot disagree and bounce a user
    /// between `/onboarding` and `/dashboard`.
    ///
    /// Blank names count as missing.
    #[must_use]
    pub fn needs_onboarding(&self) -> bool {
        !self.onboarding_completed
            || !has_text(self.first_name.as_deref())
            || !has_text(self.last_name.as_deref())
    }

    /// Capabilities granted by the profile's role.
    #[must_use]
    pub const fn capabilities(&self) -> CapabilitySet {
        self.role.capabilities()
    }

    /// "First Last", or whichever part is present.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn profile(completed: bool, first: Option<&str>, last: Option<&str>) -> Profile {
        Profile {
            principal_id: PrincipalId::new(Uuid::nil()),
            onboarding_completed: completed,
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            role: Role::Student,
        }
    }

    #[test]
    fn test_complete_profile_does_not_need_onboarding() {
        assert!(!profile(true, Some("Jane"), Some("Doe")).needs_onboarding());
    }

    #[test]
    fn test_every_missing_field_triggers_onboarding() {
        assert!(profile(false, Some("Jane"), Some("Doe")).needs_onboarding());
        assert!(profile(true, None, Some("Doe")).needs_onboarding());
        assert!(profile(true, Some("Jane"), None).needs_onboarding());
        assert!(profile(false, None, None).needs_onboarding());
    }

    #[test]
    fn test_blank_names_count_as_missing() {
        assert!(profile(true, Some("  "), Some("Doe")).needs_onboarding());
        assert!(profile(true, Some("Jane"), Some("")).needs_onboarding());
    }

    #[test]
    fn test_blank_profile_needs_onboarding() {
        let blank = Profile::blank(PrincipalId::new(Uuid::nil()));
        assert!(blank.needs_onboarding());
        assert_eq!(blank.role, Role::Student);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(
            profile(true, Some("Jane"), Some("Doe")).display_name().as_deref(),
            Some("Jane Doe")
        );
        assert_eq!(
            profile(true, Some(" Jane "), None).display_name().as_deref(),
            Some("Jane")
        );
        assert_eq!(profile(false, None, Some(" ")).display_name(), None);
    }
}
