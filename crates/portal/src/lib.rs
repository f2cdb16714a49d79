//! Campus portal library.
//!
//! The web front of the student management system: sign-in, onboarding and
//! the role-aware dashboard, all behind a single access guard. Exposed as a
//! library so the integration tests and the CLI share the same code.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use app::build_router;
