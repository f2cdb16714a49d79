//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. The access guard never does:
//! its failures end in a login redirect, not an error response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::identity::IdentityError;

/// Application-level error type for the portal.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Identity provider call failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// No verified principal.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks the capability for this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Repository(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Repository(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Identity(err) => match err {
                IdentityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                IdentityError::Rejected(_) | IdentityError::ConfirmationRequired => {
                    StatusCode::BAD_REQUEST
                }
                IdentityError::Http(_) | IdentityError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Repository(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Repository(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Identity(IdentityError::InvalidCredentials) => "Invalid credentials".to_string(),
            Self::Identity(IdentityError::Rejected(msg)) => msg.clone(),
            Self::Identity(IdentityError::ConfirmationRequired) => {
                "Check your inbox to confirm your email address".to_string()
            }
            Self::Identity(_) => "Identity service unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a principal ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(principal_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(principal_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Unauthorized("not signed in".to_string());
        assert_eq!(err.to_string(), "Unauthorized: not signed in");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Unauthorized("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Forbidden("x".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Repository(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Identity(IdentityError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Identity(IdentityError::Upstream {
                status: 503,
                message: "down".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal("connection string postgres://secret".to_string());
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::Identity(IdentityError::Upstream {
            status: 500,
            message: "stack trace".to_string(),
        });
        assert_eq!(err.public_message(), "Identity service unavailable");
    }
}
