//! Identity provider error types.

use thiserror::Error;

/// Errors returned by an [`IdentityProvider`](super::IdentityProvider).
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Transport failure (connect, timeout, TLS, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Email/password pair was not accepted.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Sign-up was refused (address taken, weak password, ...).
    #[error("sign-up rejected: {0}")]
    Rejected(String),

    /// Sign-up succeeded but the address must be confirmed before a session
    /// is issued.
    #[error("email confirmation required")]
    ConfirmationRequired,

    /// The provider answered with an unexpected status.
    #[error("identity provider returned {status}: {message}")]
    Upstream { status: u16, message: String },
}
