//! Identity provider abstraction.
//!
//! The portal never stores passwords. Sign-in and sign-up are delegated to an
//! external identity provider, which hands back an access token. The token is
//! kept in the server-side session and re-verified with the provider on every
//! guarded request, so a revoked or tampered token stops working immediately
//! even while the session cookie is still valid.

mod error;
mod gotrue;

pub use error::IdentityError;
pub use gotrue::GoTrueClient;

use async_trait::async_trait;
use secrecy::SecretString;

use campus_core::{Email, PrincipalId};

/// A principal as verified by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub email: Option<String>,
}

/// Result of a successful sign-in or sign-up.
#[derive(Clone)]
pub struct IdentityGrant {
    pub principal: Principal,
    pub access_token: String,
}

impl std::fmt::Debug for IdentityGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGrant")
            .field("principal", &self.principal)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Operations the portal needs from an identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify an access token and return the principal it belongs to.
    ///
    /// Returns `Ok(None)` when the provider rejects the token (expired,
    /// revoked, malformed). Errors are reserved for the provider being
    /// unreachable or misbehaving.
    async fn verify(&self, access_token: &str) -> Result<Option<Principal>, IdentityError>;

    /// Exchange an email/password pair for an access token.
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<IdentityGrant, IdentityError>;

    /// Create a new principal and sign it in.
    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<IdentityGrant, IdentityError>;

    /// Revoke an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}
