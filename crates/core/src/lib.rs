//! Campus Core - Shared types and access policy.
//!
//! This crate provides the types used across all campus components:
//! - `portal` - The web portal (dashboard, onboarding, login)
//! - `cli` - Command-line tools for migrations and profile management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The access guard's decision table lives here so
//! that every caller (guard middleware, onboarding page, onboarding-status API)
//! evaluates the exact same rules.
//!
//! # Modules
//!
//! - [`types`] - Principal IDs, emails, roles, capabilities and profiles
//! - [`access`] - Route classification and the guard decision table

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod types;

pub use access::{GuardFailure, GuardOutcome, RouteClass, sanitize_return_to};
pub use types::*;
