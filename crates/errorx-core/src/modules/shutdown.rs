//! Best-effort teardown run when the license expires.
//!
//! Steps run in order and each may fail on its own:
//!
//! 1. disable system proxy (if enabled)
//! 2. disable tun mode (if enabled)
//! 3. stop proxy servers (if any port is running)
//! 4. clear the session
//! 5. redirect to login with an "expired" notice
//!
//! Steps 4 and 5 always run, whatever happened before them.

use errorx_types::{GatewayError, Notice, SystemSettings};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use super::events::{ClientEvent, EventBus};
use super::gateway::BackendGateway;
use super::session::SessionStore;
use crate::error::CoreResult;
use crate::utils::SingleFlight;

pub const SHUTDOWN_KEY: &str = "license_shutdown";

pub const EXPIRED_MESSAGE: &str = "License expired. Please renew your subscription.";
pub const STOP_FAILED_MESSAGE: &str = "Failed to stop services. Please try again.";

/// Result of one teardown step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum StepStatus {
    /// Nothing to do.
    Skipped,
    Done,
    Failed(String),
}

impl StepStatus {
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    pub system_proxy: StepStatus,
    pub tun_mode: StepStatus,
    pub proxy_servers: StepStatus,
}

impl ShutdownReport {
    pub fn failures(&self) -> usize {
        [&self.system_proxy, &self.tun_mode, &self.proxy_servers]
            .iter()
            .filter(|s| s.is_failed())
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures() == 0
    }
}

pub struct ShutdownSequence {
    gateway: Arc<dyn BackendGateway>,
    session: Arc<SessionStore>,
    events: EventBus,
    flights: SingleFlight,
}

impl ShutdownSequence {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        session: Arc<SessionStore>,
        events: EventBus,
        flights: SingleFlight,
    ) -> Self {
        Self { gateway, session, events, flights }
    }

    /// Run the teardown. A second call while one is running is rejected
    /// with [`CoreError::InFlight`](crate::CoreError::InFlight).
    pub async fn run(&self) -> CoreResult<ShutdownReport> {
        let _flight = self.flights.acquire(SHUTDOWN_KEY)?;
        tracing::warn!("[Shutdown] License expired, stopping services");

        let settings = match self.gateway.get_system_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("[Shutdown] Could not read system settings, disabling both: {}", e);
                SystemSettings { enable_system_proxy: true, enable_tun_mode: true }
            },
        };

        let system_proxy = if settings.enable_system_proxy {
            self.step(
                "system proxy",
                self.gateway.set_system_proxy_enabled(false),
                "System proxy disabled",
            )
            .await
        } else {
            StepStatus::Skipped
        };

        let tun_mode = if settings.enable_tun_mode {
            self.step("tun mode", self.gateway.set_tun_mode_enabled(false), "Tun mode disabled")
                .await
        } else {
            StepStatus::Skipped
        };

        let proxy_servers = match self.gateway.get_proxy_status().await {
            Ok(ports) if ports.iter().any(|p| p.is_running()) => {
                self.step("proxy servers", self.gateway.stop_proxy(), "Server stopped successfully")
                    .await
            },
            Ok(_) => StepStatus::Skipped,
            Err(e) => {
                tracing::error!("[Shutdown] Failed to query proxy status: {}", e);
                StepStatus::Failed(e.to_string())
            },
        };

        let report = ShutdownReport { system_proxy, tun_mode, proxy_servers };
        if !report.is_clean() {
            self.events.notify(Notice::error(STOP_FAILED_MESSAGE));
        }

        self.session.logout();
        self.events.publish(ClientEvent::RedirectToLogin);
        self.events.notify(Notice::info(EXPIRED_MESSAGE));

        tracing::info!("[Shutdown] Completed with {} failed step(s)", report.failures());
        Ok(report)
    }

    async fn step<F>(&self, name: &str, call: F, success: &str) -> StepStatus
    where
        F: Future<Output = Result<(), GatewayError>>,
    {
        match call.await {
            Ok(()) => {
                tracing::info!("[Shutdown] Disabled {}", name);
                self.events.notify(Notice::success(success));
                StepStatus::Done
            },
            Err(e) => {
                tracing::error!("[Shutdown] Failed to disable {}: {}", name, e);
                StepStatus::Failed(e.to_string())
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::modules::events::{drain, notices};
    use crate::testing::MockGateway;
    use errorx_types::{NoticeLevel, ProxyPortStatus};
    use std::time::Duration;

    fn sequence(mock: &Arc<MockGateway>) -> (ShutdownSequence, Arc<SessionStore>, EventBus) {
        let session = Arc::new(SessionStore::new());
        session.login("KEY");
        let events = EventBus::new();
        let seq =
            ShutdownSequence::new(mock.clone(), Arc::clone(&session), events.clone(), SingleFlight::new());
        (seq, session, events)
    }

    #[tokio::test]
    async fn test_full_teardown_order() {
        let mock = Arc::new(
            MockGateway::new()
                .with_settings(SystemSettings { enable_system_proxy: true, enable_tun_mode: true })
                .with_proxy_status(vec![ProxyPortStatus(18010, true), ProxyPortStatus(18011, false)]),
        );
        let (seq, session, events) = sequence(&mock);
        let mut rx = events.subscribe();

        let report = seq.run().await.unwrap();
        assert!(report.is_clean());
        assert_eq!(
            mock.call_ops(),
            vec![
                "get_system_settings",
                "set_system_proxy_enabled",
                "set_tun_mode_enabled",
                "get_proxy_status",
                "stop_proxy",
            ]
        );
        assert!(!session.is_authenticated());

        let events = drain(&mut rx);
        let messages: Vec<&str> = notices(&events).iter().map(|n| n.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["System proxy disabled", "Tun mode disabled", "Server stopped successfully", EXPIRED_MESSAGE]
        );
        assert!(events.contains(&ClientEvent::RedirectToLogin));
    }

    #[tokio::test]
    async fn test_disabled_toggles_and_idle_ports_are_skipped() {
        let mock = Arc::new(MockGateway::new().with_proxy_status(vec![ProxyPortStatus(18010, false)]));
        let (seq, _, _) = sequence(&mock);

        let report = seq.run().await.unwrap();
        assert_eq!(report.system_proxy, StepStatus::Skipped);
        assert_eq!(report.tun_mode, StepStatus::Skipped);
        assert_eq!(report.proxy_servers, StepStatus::Skipped);
        assert_eq!(mock.count("stop_proxy"), 0);
    }

    #[tokio::test]
    async fn test_failed_step_does_not_abort() {
        let mock = Arc::new(
            MockGateway::new()
                .with_settings(SystemSettings { enable_system_proxy: true, enable_tun_mode: true })
                .with_proxy_status(vec![ProxyPortStatus(18010, true)]),
        );
        mock.fail("set_system_proxy_enabled", GatewayError::Rejected("denied".into()));
        let (seq, session, events) = sequence(&mock);
        let mut rx = events.subscribe();

        let report = seq.run().await.unwrap();
        assert_eq!(report.system_proxy, StepStatus::Failed("denied".into()));
        assert_eq!(report.tun_mode, StepStatus::Done);
        assert_eq!(report.proxy_servers, StepStatus::Done);
        assert!(!session.is_authenticated());

        let events = drain(&mut rx);
        let errors: Vec<_> =
            notices(&events).into_iter().filter(|n| n.level == NoticeLevel::Error).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, STOP_FAILED_MESSAGE);
        assert!(events.contains(&ClientEvent::RedirectToLogin));
    }

    #[tokio::test]
    async fn test_unreadable_settings_disable_both() {
        let mock = Arc::new(MockGateway::new());
        mock.fail("get_system_settings", GatewayError::Unreachable("down".into()));
        let (seq, _, _) = sequence(&mock);

        let report = seq.run().await.unwrap();
        assert_eq!(report.system_proxy, StepStatus::Done);
        assert_eq!(report.tun_mode, StepStatus::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_run_is_rejected() {
        let mock = Arc::new(MockGateway::new());
        mock.delay("get_system_settings", Duration::from_millis(300));
        let (seq, _, _) = sequence(&mock);

        let (first, second) = tokio::join!(seq.run(), seq.run());
        assert!(first.is_ok());
        assert!(matches!(second, Err(CoreError::InFlight { key }) if key == SHUTDOWN_KEY));
        assert_eq!(mock.count("get_system_settings"), 1);
    }
}
