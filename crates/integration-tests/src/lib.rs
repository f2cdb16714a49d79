//! Integration test harness for the Campus portal.
//!
//! Builds the real router (guard, sessions, handlers) over in-memory fakes of
//! the identity provider and profile store, so tests run without a database
//! or a live identity service.
//!
//! ```rust,ignore
//! let app = TestApp::new();
//! app.identity.add_account("jane@campus.test", "correct-horse");
//! let cookie = app.sign_in("jane@campus.test", "correct-horse").await;
//! let response = app.get("/dashboard", Some(&cookie)).await;
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use secrecy::{ExposeSecret, SecretString};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use campus_core::{Email, PrincipalId, Profile, Role};
use campus_portal::config::{IdentityConfig, PortalConfig};
use campus_portal::db::RepositoryError;
use campus_portal::middleware::{SESSION_COOKIE_NAME, session_layer};
use campus_portal::services::identity::{
    IdentityError, IdentityGrant, IdentityProvider, Principal,
};
use campus_portal::services::profiles::ProfileStore;
use campus_portal::state::AppState;

// =============================================================================
// Identity fake
// =============================================================================

struct Account {
    principal: PrincipalId,
    email: String,
    password: String,
}

/// In-memory identity provider.
#[derive(Default)]
pub struct FakeIdentity {
    accounts: Mutex<Vec<Account>>,
    tokens: Mutex<HashMap<String, Principal>>,
    issued: AtomicUsize,
    verify_calls: AtomicUsize,
    unavailable: AtomicBool,
    require_confirmation: AtomicBool,
}

impl FakeIdentity {
    /// Register an account and return its principal ID.
    pub fn add_account(&self, email: &str, password: &str) -> PrincipalId {
        let principal = PrincipalId::new(uuid::Uuid::new_v4());
        self.accounts.lock().unwrap().push(Account {
            principal,
            email: email.to_owned(),
            password: password.to_owned(),
        });
        principal
    }

    /// Number of `verify` calls so far.
    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    /// Make `verify` fail as if the service were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make `sign_up` behave like a project with email confirmation on.
    pub fn set_require_confirmation(&self, required: bool) {
        self.require_confirmation.store(required, Ordering::SeqCst);
    }

    /// Revoke every issued token.
    pub fn revoke_all(&self) {
        self.tokens.lock().unwrap().clear();
    }

    /// Re-point every issued token at a different principal.
    pub fn reassign_tokens(&self, principal: PrincipalId) {
        for verified in self.tokens.lock().unwrap().values_mut() {
            verified.id = principal;
        }
    }

    fn issue(&self, principal: PrincipalId, email: &str) -> IdentityGrant {
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        let access_token = format!("token-{n}");
        let principal = Principal {
            id: principal,
            email: Some(email.to_owned()),
        };
        self.tokens
            .lock()
            .unwrap()
            .insert(access_token.clone(), principal.clone());
        IdentityGrant {
            principal,
            access_token,
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify(&self, access_token: &str) -> Result<Option<Principal>, IdentityError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::Upstream {
                status: 503,
                message: "identity service unavailable".to_owned(),
            });
        }
        Ok(self.tokens.lock().unwrap().get(access_token).cloned())
    }

    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<IdentityGrant, IdentityError> {
        let principal = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email.as_str() && a.password == password.expose_secret())
            .map(|a| a.principal)
            .ok_or(IdentityError::InvalidCredentials)?;
        Ok(self.issue(principal, email.as_str()))
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<IdentityGrant, IdentityError> {
        let exists = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.email == email.as_str());
        if exists {
            return Err(IdentityError::Rejected("User already registered".to_owned()));
        }

        let principal = self.add_account(email.as_str(), password.expose_secret());
        if self.require_confirmation.load(Ordering::SeqCst) {
            return Err(IdentityError::ConfirmationRequired);
        }
        Ok(self.issue(principal, email.as_str()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        self.tokens.lock().unwrap().remove(access_token);
        Ok(())
    }
}

// =============================================================================
// Profile fake
// =============================================================================

/// In-memory profile store.
#[derive(Default)]
pub struct FakeProfiles {
    rows: Mutex<HashMap<PrincipalId, Profile>>,
    fetch_calls: AtomicUsize,
    failing: AtomicBool,
}

impl FakeProfiles {
    /// Insert or replace a profile row.
    pub fn put(&self, profile: Profile) {
        self.rows
            .lock()
            .unwrap()
            .insert(profile.principal_id, profile);
    }

    /// Delete the row for `principal`.
    pub fn remove(&self, principal: PrincipalId) {
        self.rows.lock().unwrap().remove(&principal);
    }

    /// Current row for `principal`, if any.
    pub fn get(&self, principal: PrincipalId) -> Option<Profile> {
        self.rows.lock().unwrap().get(&principal).cloned()
    }

    /// Number of `fetch` calls so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Make every operation fail with a database error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn fetch(&self, principal: PrincipalId) -> Result<Option<Profile>, RepositoryError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.get(principal))
    }

    async fn ensure(&self, principal: PrincipalId) -> Result<(), RepositoryError> {
        self.check()?;
        self.rows
            .lock()
            .unwrap()
            .entry(principal)
            .or_insert_with(|| Profile::blank(principal));
        Ok(())
    }

    async fn complete_onboarding(
        &self,
        principal: PrincipalId,
        first_name: &str,
        last_name: &str,
    ) -> Result<Profile, RepositoryError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let profile = rows
            .entry(principal)
            .or_insert_with(|| Profile::blank(principal));
        profile.first_name = Some(first_name.to_owned());
        profile.last_name = Some(last_name.to_owned());
        profile.onboarding_completed = true;
        Ok(profile.clone())
    }

    async fn set_role(
        &self,
        principal: PrincipalId,
        role: Role,
    ) -> Result<Profile, RepositoryError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let profile = rows.get_mut(&principal).ok_or(RepositoryError::NotFound)?;
        profile.role = role;
        Ok(profile.clone())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check()
    }
}

/// A finished profile with the given names and role.
pub fn onboarded_profile(principal: PrincipalId, first: &str, last: &str, role: Role) -> Profile {
    Profile {
        principal_id: principal,
        onboarding_completed: true,
        first_name: Some(first.to_owned()),
        last_name: Some(last.to_owned()),
        role,
    }
}

// =============================================================================
// Test application
// =============================================================================

/// Configuration suitable for tests. Nothing in it is ever dialled.
pub fn test_config(mock_auth: bool) -> PortalConfig {
    PortalConfig {
        database_url: SecretString::from("postgres://localhost/campus_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_owned(),
        identity: IdentityConfig {
            url: url::Url::parse("http://identity.invalid").unwrap(),
            anon_key: SecretString::from("test-anon-key"),
            timeout: Duration::from_secs(1),
        },
        mock_auth,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// The portal router wired to in-memory collaborators.
pub struct TestApp {
    pub router: Router,
    pub identity: Arc<FakeIdentity>,
    pub profiles: Arc<FakeProfiles>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Router with mock auth switched on.
    pub fn with_mock_auth() -> Self {
        Self::build(true)
    }

    fn build(mock_auth: bool) -> Self {
        let identity = Arc::new(FakeIdentity::default());
        let profiles = Arc::new(FakeProfiles::default());
        let state = AppState::new(
            test_config(mock_auth),
            identity.clone(),
            profiles.clone(),
        );
        let router = campus_portal::build_router(state, session_layer(MemoryStore::default(), false));

        Self {
            router,
            identity,
            profiles,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, path: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_owned())).unwrap())
            .await
    }

    /// Sign in through `POST /login` and return the session cookie.
    pub async fn sign_in(&self, email: &str, password: &str) -> String {
        let form = format!("email={}&password={password}", email.replace('@', "%40"));
        let response = self.post_form("/login", &form, None).await;
        session_cookie(&response).expect("login should set a session cookie")
    }

    /// Create an account with a profile and return its session cookie.
    pub async fn signed_in_with(&self, email: &str, profile: impl FnOnce(PrincipalId) -> Profile) -> (PrincipalId, String) {
        let principal = self.identity.add_account(email, "correct-horse");
        self.profiles.put(profile(principal));
        let cookie = self.sign_in(email, "correct-horse").await;
        (principal, cookie)
    }
}

// =============================================================================
// Response helpers
// =============================================================================

/// `Location` header of a redirect.
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// `name=value` pair of the session cookie, if the response set one.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
        .map(str::to_owned)
}

/// Collect a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
