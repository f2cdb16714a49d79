//! Access policy for the portal.
//!
//! The guard middleware in the portal crate does the I/O (session read,
//! principal verification, profile fetch) and feeds the results into the pure
//! functions here. Keeping the decision table free of I/O lets it be tested
//! exhaustively and reused by every caller.
//!
//! ```text
//! Start -> BypassCheck -> IdentityCheck -> ProfileCheck -> OnboardingDecision
//!       -> Allow | RedirectLogin | RedirectOnboarding | RedirectDashboard
//! ```

pub mod policy;
pub mod routes;

pub use policy::{GuardFailure, GuardOutcome, authenticated, bypass, failed, unauthenticated};
pub use routes::{
    DASHBOARD_PATH, LOGIN_PATH, ONBOARDING_PATH, REDIRECT_PARAM, REGISTER_PATH, RouteClass,
    sanitize_return_to,
};
