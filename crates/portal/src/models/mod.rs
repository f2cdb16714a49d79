//! Domain models for the portal.

pub mod session;

pub use session::{AuthSession, keys as session_keys};
