//! Profile management commands.
//!
//! Accounts live in the identity service. These commands only touch the
//! portal's own profile rows, keyed by the identity service's principal ID.

use campus_core::{PrincipalId, Role};
use campus_portal::db::{ProfileRepository, RepositoryError};
use campus_portal::services::profiles::ProfileStore;

use super::{CommandError, connect};

/// Print a profile and its onboarding state.
pub async fn show(principal_id: &str) -> Result<(), CommandError> {
    let principal = parse_principal(principal_id)?;
    let repo = ProfileRepository::new(connect().await?);

    let profile = repo
        .fetch(principal)
        .await?
        .ok_or_else(|| CommandError::ProfileNotFound(principal.to_string()))?;

    tracing::info!("Principal:        {}", profile.principal_id);
    tracing::info!(
        "Name:             {}",
        profile.display_name().unwrap_or_else(|| "(not set)".to_owned())
    );
    tracing::info!("Role:             {}", profile.role);
    tracing::info!("Onboarding done:  {}", profile.onboarding_completed);
    tracing::info!("Needs onboarding: {}", profile.needs_onboarding());
    tracing::info!(
        "Capabilities:     {}",
        profile
            .capabilities()
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}

/// Change the role on an existing profile.
pub async fn set_role(principal_id: &str, role: &str) -> Result<(), CommandError> {
    let principal = parse_principal(principal_id)?;
    let role: Role = role
        .parse()
        .map_err(|e| CommandError::InvalidArgument(format!("{e}")))?;

    let repo = ProfileRepository::new(connect().await?);

    let profile = match repo.set_role(principal, role).await {
        Ok(profile) => profile,
        Err(RepositoryError::NotFound) => {
            return Err(CommandError::ProfileNotFound(principal.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        "Role for {} is now {}",
        profile.principal_id,
        profile.role
    );
    Ok(())
}

fn parse_principal(raw: &str) -> Result<PrincipalId, CommandError> {
    raw.parse()
        .map_err(|e| CommandError::InvalidArgument(format!("{e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_principal_rejects_garbage() {
        assert!(matches!(
            parse_principal("not-a-uuid"),
            Err(CommandError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_parse_principal_accepts_uuid() {
        assert!(parse_principal("6f1c2d3e-0000-4000-8000-000000000001").is_ok());
    }
}
