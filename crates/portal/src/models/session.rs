//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use campus_core::PrincipalId;

/// Cached identity stored in the session after sign-in.
///
/// This is the "session" half of the guard's double check. It is only trusted
/// once the identity provider confirms that `access_token` still belongs to
/// `principal_id`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Principal the token was issued to.
    pub principal_id: PrincipalId,
    /// Bearer token from the identity provider.
    pub access_token: String,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("principal_id", &self.principal_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the signed-in principal and its access token.
    pub const AUTH_SESSION: &str = "auth_session";
}
