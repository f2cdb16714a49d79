//! Profile store abstraction.

use async_trait::async_trait;

use campus_core::{PrincipalId, Profile, Role};

use crate::db::RepositoryError;

/// Read and write access to application profiles.
///
/// The access guard only calls [`ProfileStore::fetch`]. The writes belong to
/// the registration, onboarding and administration flows.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Profile for `principal`, or `None` if no row exists yet.
    async fn fetch(&self, principal: PrincipalId) -> Result<Option<Profile>, RepositoryError>;

    /// Create an empty profile row for a newly authenticated principal.
    async fn ensure(&self, principal: PrincipalId) -> Result<(), RepositoryError>;

    /// Store the onboarding answers and mark onboarding as completed.
    async fn complete_onboarding(
        &self,
        principal: PrincipalId,
        first_name: &str,
        last_name: &str,
    ) -> Result<Profile, RepositoryError>;

    /// Change a principal's role. Fails with `NotFound` if there is no profile.
    async fn set_role(&self, principal: PrincipalId, role: Role)
    -> Result<Profile, RepositoryError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}
