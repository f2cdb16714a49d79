//! Core types for the campus portal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod profile;
pub mod role;

pub use email::{Email, EmailError};
pub use id::{PrincipalId, PrincipalIdError};
pub use profile::Profile;
pub use role::{Capability, CapabilitySet, Role, RoleParseError};
