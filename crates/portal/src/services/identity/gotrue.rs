//! Client for a GoTrue-compatible identity API.
//!
//! # Endpoints
//!
//! ```text
//! GET  /auth/v1/user                       verify bearer token
//! POST /auth/v1/token?grant_type=password  sign in
//! POST /auth/v1/signup                     sign up
//! POST /auth/v1/logout                     revoke bearer token
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_core::{Email, PrincipalId};

use super::{IdentityError, IdentityGrant, IdentityProvider, Principal};
use crate::config::IdentityConfig;

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Uuid,
    email: Option<String>,
}

/// Token grant. Sign-up returns the same shape when auto-confirm is on, and a
/// bare user object (no token) when email confirmation is required.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    access_token: Option<String>,
    user: Option<UserResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl ErrorResponse {
    fn into_message(self) -> Option<String> {
        self.error_description.or(self.msg).or(self.message)
    }
}

impl From<UserResponse> for Principal {
    fn from(user: UserResponse) -> Self {
        Self {
            id: PrincipalId::new(user.id),
            email: user.email,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the identity provider.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct GoTrueClient {
    inner: Arc<GoTrueClientInner>,
}

struct GoTrueClientInner {
    client: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
}

impl GoTrueClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(GoTrueClientInner {
                client,
                base_url: config.url.as_str().trim_end_matches('/').to_owned(),
                anon_key: config.anon_key.clone(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.inner.base_url)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.with_key(self.inner.client.get(self.endpoint(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.with_key(self.inner.client.post(self.endpoint(path)))
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", self.inner.anon_key.expose_secret())
    }

    async fn grant(response: Response) -> Result<IdentityGrant, IdentityError> {
        let session: SessionResponse = response.json().await?;

        match (session.access_token, session.user) {
            (Some(access_token), Some(user)) => Ok(IdentityGrant {
                principal: user.into(),
                access_token,
            }),
            (None, _) => Err(IdentityError::ConfirmationRequired),
            (Some(_), None) => Err(IdentityError::Upstream {
                status: StatusCode::OK.as_u16(),
                message: "token response without user".to_owned(),
            }),
        }
    }
}

/// Turn a non-success response into an error, keeping the provider's message.
async fn upstream_error(response: Response) -> IdentityError {
    let status = response.status();
    let message = response
        .json::<ErrorResponse>()
        .await
        .ok()
        .and_then(ErrorResponse::into_message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_owned());

    IdentityError::Upstream {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn verify(&self, access_token: &str) -> Result<Option<Principal>, IdentityError> {
        let response = self.get("user").bearer_auth(access_token).send().await?;

        match response.status() {
            status if status.is_success() => {
                let user: UserResponse = response.json().await?;
                Ok(Some(user.into()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(upstream_error(response).await),
        }
    }

    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<IdentityGrant, IdentityError> {
        let response = self
            .post("token?grant_type=password")
            .json(&PasswordCredentials {
                email: email.as_str(),
                password: password.expose_secret(),
            })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Self::grant(response).await,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(IdentityError::InvalidCredentials)
            }
            _ => Err(upstream_error(response).await),
        }
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<IdentityGrant, IdentityError> {
        let response = self
            .post("signup")
            .json(&PasswordCredentials {
                email: email.as_str(),
                password: password.expose_secret(),
            })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Self::grant(response).await,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                match upstream_error(response).await {
                    IdentityError::Upstream { message, .. } => {
                        Err(IdentityError::Rejected(message))
                    }
                    other => Err(other),
                }
            }
            _ => Err(upstream_error(response).await),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self.post("logout").bearer_auth(access_token).send().await?;

        // An already-invalid token is as signed out as it gets.
        if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(upstream_error(response).await)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use super::*;

    fn client(url: &str) -> GoTrueClient {
        GoTrueClient::new(&IdentityConfig {
            url: Url::parse(url).unwrap(),
            anon_key: SecretString::from("anon"),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(
            client("https://auth.campus.test/").endpoint("user"),
            "https://auth.campus.test/auth/v1/user"
        );
        assert_eq!(
            client("https://campus.test/identity").endpoint("token"),
            "https://campus.test/identity/auth/v1/token"
        );
    }

    #[test]
    fn test_session_response_with_token() {
        let json = r#"{
            "access_token": "tok",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {"id": "6f1c2d3e-4a5b-4c6d-8e7f-0a1b2c3d4e5f", "email": "jane@campus.test"}
        }"#;
        let session: SessionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token.as_deref(), Some("tok"));
        assert_eq!(
            session.user.unwrap().email.as_deref(),
            Some("jane@campus.test")
        );
    }

    #[test]
    fn test_signup_response_without_token() {
        let json = r#"{"id": "6f1c2d3e-4a5b-4c6d-8e7f-0a1b2c3d4e5f", "email": "jane@campus.test"}"#;
        let session: SessionResponse = serde_json::from_str(json).unwrap();
        assert!(session.access_token.is_none());
        assert!(session.user.is_none());
    }

    #[test]
    fn test_error_message_precedence() {
        let err: ErrorResponse =
            serde_json::from_str(r#"{"error":"invalid_grant","error_description":"bad login"}"#)
                .unwrap();
        assert_eq!(err.into_message().as_deref(), Some("bad login"));

        let err: ErrorResponse =
            serde_json::from_str(r#"{"code":422,"msg":"User already registered"}"#).unwrap();
        assert_eq!(err.into_message().as_deref(), Some("User already registered"));

        assert_eq!(ErrorResponse::default().into_message(), None);
    }
}
