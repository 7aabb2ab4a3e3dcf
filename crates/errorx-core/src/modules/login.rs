//! License-key login boundary.

use errorx_types::{LicenseError, SessionCredentials};
use std::sync::Arc;

use super::events::{ClientEvent, EventBus};
use super::gateway::BackendGateway;
use super::session::SessionStore;
use crate::error::{CoreError, CoreResult};
use crate::utils::SingleFlight;

pub const LOGIN_KEY: &str = "login";

pub struct LoginGate {
    gateway: Arc<dyn BackendGateway>,
    session: Arc<SessionStore>,
    events: EventBus,
    flights: SingleFlight,
}

impl LoginGate {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        session: Arc<SessionStore>,
        events: EventBus,
        flights: SingleFlight,
    ) -> Self {
        Self { gateway, session, events, flights }
    }

    /// Validate `key` with the backend and open a session on success.
    ///
    /// Validation errors are returned for inline display; nothing is
    /// published as a notice.
    pub async fn submit(&self, key: &str) -> CoreResult<SessionCredentials> {
        let key = key.trim();
        if key.is_empty() {
            return Err(LicenseError::EmptyKey.into());
        }

        let _flight = self.flights.acquire(LOGIN_KEY)?;

        match self.gateway.validate_license(key).await {
            Ok(true) => {
                let creds = self.session.login(key);
                self.events.publish(ClientEvent::NavigateHome);
                Ok(creds)
            },
            Ok(false) => {
                tracing::info!("License key rejected by service");
                Err(LicenseError::InvalidKey.into())
            },
            Err(e) => {
                tracing::error!("License validation error: {}", e);
                Err(CoreError::LoginUnavailable(e))
            },
        }
    }

    /// Login screen shown: hide the tray and drop any stale authentication.
    pub async fn enter(&self) {
        if let Err(e) = self.gateway.hide_tray().await {
            tracing::warn!("Failed to hide tray: {}", e);
        }
        self.session.logout();
    }

    /// Login screen left: bring the tray back.
    pub async fn leave(&self) {
        if let Err(e) = self.gateway.show_tray().await {
            tracing::warn!("Failed to show tray: {}", e);
        }
    }

    pub async fn quit(&self) -> CoreResult<()> {
        self.session.logout();
        self.gateway.exit_app().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::modules::events::drain;
    use crate::testing::MockGateway;
    use errorx_types::GatewayError;
    use std::time::Duration;

    fn gate(mock: &Arc<MockGateway>) -> (LoginGate, Arc<SessionStore>, EventBus) {
        let session = Arc::new(SessionStore::new());
        let events = EventBus::new();
        let gate = LoginGate::new(
            mock.clone(),
            Arc::clone(&session),
            events.clone(),
            SingleFlight::new(),
        );
        (gate, session, events)
    }

    #[tokio::test]
    async fn test_empty_key_makes_no_backend_call() {
        let mock = Arc::new(MockGateway::new());
        let (gate, _, _) = gate(&mock);

        let err = gate.submit("   ").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a license key");
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_valid_key_opens_session() {
        let mock = Arc::new(MockGateway::new().with_valid_key("GOOD-KEY"));
        let (gate, session, events) = gate(&mock);
        let mut rx = events.subscribe();

        let creds = gate.submit(" GOOD-KEY ").await.unwrap();
        assert_eq!(creds.license_key, "GOOD-KEY");
        assert!(session.is_authenticated());
        assert_eq!(drain(&mut rx), vec![ClientEvent::NavigateHome]);
    }

    #[tokio::test]
    async fn test_invalid_key_and_transport_failure() {
        let mock = Arc::new(MockGateway::new().with_valid_key("GOOD-KEY"));
        let (gate, session, _) = gate(&mock);

        let err = gate.submit("BAD").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid license key");

        mock.fail("validate_license", GatewayError::Unreachable("refused".into()));
        let err = gate.submit("GOOD-KEY").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to validate license. Please try again.");
        assert!(!session.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_submit_is_rejected() {
        let mock = Arc::new(MockGateway::new().with_valid_key("K"));
        mock.delay("validate_license", Duration::from_millis(200));
        let (gate, _, _) = gate(&mock);

        let (first, second) = tokio::join!(gate.submit("K"), gate.submit("K"));
        assert!(first.is_ok());
        assert!(matches!(second, Err(CoreError::InFlight { .. })));
        assert_eq!(mock.count("validate_license"), 1);
    }

    #[tokio::test]
    async fn test_enter_clears_session_even_if_tray_fails() {
        let mock = Arc::new(MockGateway::new());
        mock.fail("hide_tray", GatewayError::Unreachable("gone".into()));
        let (gate, session, _) = gate(&mock);
        session.login("K");

        gate.enter().await;
        assert!(!session.is_authenticated());
        gate.leave().await;
        assert_eq!(mock.call_ops(), vec!["hide_tray", "show_tray"]);
    }
}
