//! Process-wide session credentials.

use errorx_types::SessionCredentials;
use parking_lot::RwLock;

use crate::error::{CoreError, CoreResult};

/// Holds the single active session. Both credential fields are set and
/// cleared together.
#[derive(Debug, Default)]
pub struct SessionStore {
    credentials: RwLock<Option<SessionCredentials>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, license_key: &str) -> SessionCredentials {
        let creds = SessionCredentials::authenticated(license_key);
        *self.credentials.write() = Some(creds.clone());
        tracing::info!("Session started for {}", creds.masked_key());
        creds
    }

    /// Clear the session. Returns whether one was held.
    pub fn logout(&self) -> bool {
        let had_session = self.credentials.write().take().is_some();
        if had_session {
            tracing::info!("Session cleared");
        }
        had_session
    }

    pub fn credentials(&self) -> Option<SessionCredentials> {
        self.credentials.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.read().as_ref().is_some_and(|c| c.is_authenticated)
    }

    /// Route guard: the credentials, or [`CoreError::NotAuthenticated`].
    pub fn require_auth(&self) -> CoreResult<SessionCredentials> {
        self.credentials()
            .filter(|c| c.is_authenticated)
            .ok_or(CoreError::NotAuthenticated)
    }
}
