//! HTTP middleware stack for the portal.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame denial, no-store)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Access guard (login / onboarding / dashboard redirects)

pub mod access_guard;
pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use access_guard::access_guard;
pub use auth::{RequireAccess, clear_auth_session, set_auth_session};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_layer};
