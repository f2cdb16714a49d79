//! Services backing the portal: identity provider, profile store, and the
//! access resolution shared by the guard and the onboarding-status API.

pub mod access;
pub mod identity;
pub mod profiles;
