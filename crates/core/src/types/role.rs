//! Roles and the capabilities they grant.
//!
//! Views never branch on the role directly. A request resolves its
//! [`CapabilitySet`] once and handlers ask it whether an action is permitted.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "campus.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// School staff with full access, including user management.
    Admin,
    /// Runs courses and records grades.
    Teacher,
    /// Default for every new principal.
    #[default]
    Student,
}

/// An action gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageUsers,
    ManageCourses,
    ViewStudents,
    RecordGrades,
    ViewOwnGrades,
    EnrollInCourses,
}

impl Capability {
    /// Every capability, in display order.
    pub const ALL: [Self; 6] = [
        Self::ManageUsers,
        Self::ManageCourses,
        Self::ViewStudents,
        Self::RecordGrades,
        Self::ViewOwnGrades,
        Self::EnrollInCourses,
    ];

    /// Human-readable label for menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ManageUsers => "Manage users",
            Self::ManageCourses => "Manage courses",
            Self::ViewStudents => "View students",
            Self::RecordGrades => "Record grades",
            Self::ViewOwnGrades => "View my grades",
            Self::EnrollInCourses => "Enroll in courses",
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}' (expected admin, teacher or student)")]
pub struct RoleParseError(String);

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }

    /// Capabilities granted to this role.
    #[must_use]
    pub const fn capabilities(self) -> CapabilitySet {
        match self {
            Self::Admin => CapabilitySet::of(&[
                Capability::ManageUsers,
                Capability::ManageCourses,
                Capability::ViewStudents,
                Capability::RecordGrades,
            ]),
            Self::Teacher => CapabilitySet::of(&[
                Capability::ManageCourses,
                Capability::ViewStudents,
                Capability::RecordGrades,
            ]),
            Self::Student => {
                CapabilitySet::of(&[Capability::ViewOwnGrades, Capability::EnrollInCourses])
            }
        }
    }

    /// Shorthand for `self.capabilities().contains(capability)`.
    #[must_use]
    pub const fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }

    /// Admins and teachers share the staff-only areas of the dashboard.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Teacher)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

/// Fixed set of capabilities, packed into a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    /// The empty set.
    pub const NONE: Self = Self(0);

    #[must_use]
    #[allow(clippy::indexing_slicing)] // bounded by the loop condition
    pub const fn of(capabilities: &[Capability]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < capabilities.len() {
            bits |= capabilities[i].bit();
            i += 1;
        }
        Self(bits)
    }

    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the contained capabilities in [`Capability::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |capability| self.contains(*capability))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" Teacher ".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!("STUDENT".parse::<Role>().unwrap(), Role::Student);
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"teacher\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_default_role_is_student() {
        assert_eq!(Role::default(), Role::Student);
    }

    #[test]
    fn test_staff_capabilities() {
        for role in [Role::Admin, Role::Teacher] {
            assert!(role.is_staff());
            assert!(role.can(Capability::ViewStudents));
            assert!(role.can(Capability::RecordGrades));
            assert!(!role.can(Capability::EnrollInCourses));
        }
        assert!(Role::Admin.can(Capability::ManageUsers));
        assert!(!Role::Teacher.can(Capability::ManageUsers));
    }

    #[test]
    fn test_student_capabilities() {
        let caps: Vec<_> = Role::Student.capabilities().iter().collect();
        assert_eq!(
            caps,
            vec![Capability::ViewOwnGrades, Capability::EnrollInCourses]
        );
        assert!(!Role::Student.is_staff());
    }

    #[test]
    fn test_capability_set_empty() {
        assert!(CapabilitySet::NONE.is_empty());
        assert_eq!(CapabilitySet::NONE.iter().count(), 0);
        assert!(!Role::Student.capabilities().is_empty());
    }
}
