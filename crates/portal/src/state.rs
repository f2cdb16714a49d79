//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PortalConfig;
use crate::services::identity::IdentityProvider;
use crate::services::profiles::ProfileStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds no per-request or mutable state: the
/// identity provider and profile store are external collaborators that are
/// queried afresh on every request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        config: PortalConfig,
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                identity,
                profiles,
            }),
        }
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get the identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    /// Get the profile store.
    #[must_use]
    pub fn profiles(&self) -> &dyn ProfileStore {
        self.inner.profiles.as_ref()
    }

    /// Whether identity checks are switched off (local development only).
    #[must_use]
    pub fn mock_auth(&self) -> bool {
        self.inner.config.mock_auth
    }
}
