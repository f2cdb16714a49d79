//! Identity and profile resolution shared by the access guard and the
//! onboarding-status API.
//!
//! Both callers go through these functions and through
//! [`Profile::needs_onboarding`], so a client-side status check can never
//! disagree with the server-side guard for the same state.

use tower_sessions::Session;

use campus_core::{CapabilitySet, GuardFailure, PrincipalId, Profile, Role};

use super::identity::{IdentityProvider, Principal};
use super::profiles::ProfileStore;
use crate::models::{AuthSession, session_keys};

/// Identity and profile of the caller, resolved once per request.
///
/// The guard inserts this into request extensions when it lets a request
/// through, so handlers reuse the profile it already fetched. It is never
/// carried across requests.
#[derive(Debug, Clone)]
pub struct AccessContext {
    pub principal: PrincipalId,
    pub email: Option<String>,
    pub profile: Profile,
    pub capabilities: CapabilitySet,
}

impl AccessContext {
    #[must_use]
    pub fn new(principal: &Principal, profile: Profile) -> Self {
        Self {
            principal: principal.id,
            email: principal.email.clone(),
            capabilities: profile.capabilities(),
            profile,
        }
    }

    /// Stand-in identity used while mock auth is enabled.
    #[must_use]
    pub fn demo() -> Self {
        let principal = PrincipalId::new(uuid::Uuid::nil());
        let profile = Profile {
            principal_id: principal,
            onboarding_completed: true,
            first_name: Some("Demo".to_owned()),
            last_name: Some("User".to_owned()),
            role: Role::Admin,
        };

        Self {
            principal,
            email: Some("demo@localhost".to_owned()),
            capabilities: profile.capabilities(),
            profile,
        }
    }

    #[must_use]
    pub fn needs_onboarding(&self) -> bool {
        self.profile.needs_onboarding()
    }
}

/// Read the cached identity from the session.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn read_auth_session(
    session: &Session,
) -> Result<Option<AuthSession>, tower_sessions::session::Error> {
    session.get::<AuthSession>(session_keys::AUTH_SESSION).await
}

/// Resolve the verified principal behind a session.
///
/// Reads the cached session, then asks the identity provider to verify its
/// token. Returns `Ok(None)` when either read comes back empty or when the
/// provider reports a different principal than the session claims.
///
/// # Errors
///
/// Returns [`GuardFailure::IdentityUnavailable`] if the session store or the
/// identity provider fails.
pub async fn resolve_principal(
    identity: &dyn IdentityProvider,
    session: &Session,
) -> Result<Option<Principal>, GuardFailure> {
    let cached = read_auth_session(session).await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read session");
        GuardFailure::IdentityUnavailable
    })?;

    let Some(cached) = cached else {
        return Ok(None);
    };

    let verified = identity.verify(&cached.access_token).await.map_err(|e| {
        tracing::warn!(error = %e, principal_id = %cached.principal_id, "Token verification failed");
        GuardFailure::IdentityUnavailable
    })?;

    match verified {
        Some(principal) if principal.id == cached.principal_id => Ok(Some(principal)),
        Some(principal) => {
            tracing::warn!(
                session_principal = %cached.principal_id,
                verified_principal = %principal.id,
                "Session does not match verified principal"
            );
            Ok(None)
        }
        None => {
            tracing::debug!(principal_id = %cached.principal_id, "Session token rejected");
            Ok(None)
        }
    }
}

/// Load the profile of a verified principal.
///
/// A principal without a profile row gets [`Profile::blank`], which sends it
/// through onboarding.
///
/// # Errors
///
/// Returns [`GuardFailure::ProfileFetchFailed`] if the store query fails.
pub async fn load_profile(
    profiles: &dyn ProfileStore,
    principal: PrincipalId,
) -> Result<Profile, GuardFailure> {
    match profiles.fetch(principal).await {
        Ok(Some(profile)) => Ok(profile),
        Ok(None) => Ok(Profile::blank(principal)),
        Err(e) => {
            tracing::error!(error = %e, principal_id = %principal, "Profile fetch failed");
            Err(GuardFailure::ProfileFetchFailed)
        }
    }
}
