//! Dashboard route handlers.
//!
//! Everything under `/dashboard` is protected. The guard has already checked
//! identity and onboarding; these handlers only check capabilities.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::Path, response::IntoResponse};

use campus_core::Capability;

use crate::error::{AppError, Result};
use crate::middleware::RequireAccess;
use crate::services::access::AccessContext;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub heading: String,
    pub name: String,
    pub role: String,
    pub actions: Vec<&'static str>,
}

impl DashboardTemplate {
    fn for_access(access: &AccessContext, heading: String, actions: Vec<&'static str>) -> Self {
        Self {
            heading,
            name: access
                .profile
                .display_name()
                .or_else(|| access.email.clone())
                .unwrap_or_else(|| access.principal.to_string()),
            role: access.profile.role.to_string(),
            actions,
        }
    }
}

/// Dashboard home: what the caller's role allows.
pub async fn index(RequireAccess(access): RequireAccess) -> impl IntoResponse {
    let actions = access.capabilities.iter().map(Capability::label).collect();
    let heading = if access.profile.role.is_staff() {
        "Staff dashboard"
    } else {
        "Student dashboard"
    };
    DashboardTemplate::for_access(&access, heading.to_owned(), actions)
}

/// A dashboard section, gated by capability.
pub async fn section(
    Path(rest): Path<String>,
    RequireAccess(access): RequireAccess,
) -> Result<impl IntoResponse> {
    let name = rest.split('/').next().unwrap_or_default();
    let Some(section) = Section::from_segment(name) else {
        return Err(AppError::NotFound(format!("No dashboard section '{name}'")));
    };

    let granted: Vec<&'static str> = section
        .capabilities()
        .iter()
        .copied()
        .filter(|c| access.capabilities.contains(*c))
        .map(Capability::label)
        .collect();

    if granted.is_empty() {
        tracing::info!(
            principal_id = %access.principal,
            role = %access.profile.role,
            section = section.title(),
            "Dashboard section denied"
        );
        return Err(AppError::Forbidden(format!(
            "Your role cannot open {}",
            section.title()
        )));
    }

    Ok(DashboardTemplate::for_access(
        &access,
        section.title().to_owned(),
        granted,
    ))
}

/// Known dashboard sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Students,
    Courses,
    Grades,
    Users,
}

impl Section {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "students" => Some(Self::Students),
            "courses" => Some(Self::Courses),
            "grades" => Some(Self::Grades),
            "users" => Some(Self::Users),
            _ => None,
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Students => "Students",
            Self::Courses => "Courses",
            Self::Grades => "Grades",
            Self::Users => "Users",
        }
    }

    /// Any one of these opens the section.
    const fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::Students => &[Capability::ViewStudents],
            Self::Courses => &[Capability::ManageCourses, Capability::EnrollInCourses],
            Self::Grades => &[Capability::RecordGrades, Capability::ViewOwnGrades],
            Self::Users => &[Capability::ManageUsers],
        }
    }
}
