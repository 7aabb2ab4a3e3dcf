//! License Expiry Monitor
//!
//! Recomputes remaining license time on a fixed tick and fires the
//! shutdown sequence exactly once when it crosses zero.
//!
//! ```text
//! ┌──────────┐  remaining <= 0  ┌───────────┐  sequence resolved  ┌────────────┐
//! │  Active  │ ───────────────▶ │ Expiring  │ ──────────────────▶ │ Terminated │
//! └──────────┘                  └───────────┘                     └────────────┘
//!      ▲            set_record (new LicenseRecord)                      │
//!      └────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use errorx_types::LicenseRecord;

use super::gateway::BackendGateway;
use super::license::remaining_time;
use super::shutdown::{ShutdownReport, ShutdownSequence};
use crate::error::CoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    Active,
    Expiring,
    Terminated,
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorState::Active => write!(f, "active"),
            MonitorState::Expiring => write!(f, "expiring"),
            MonitorState::Terminated => write!(f, "terminated"),
        }
    }
}

/// What a single tick observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No license record loaded yet.
    NoRecord,
    /// Plan length unknown; expiry is never enforced for this record.
    Unmapped,
    /// License still valid for the given time.
    Valid(TimeDelta),
    /// Expired, but the shutdown already fired or is firing.
    AlreadyFired,
    /// This tick fired the shutdown sequence.
    Fired(ShutdownReport),
}

pub struct LicenseMonitor {
    gateway: Arc<dyn BackendGateway>,
    shutdown: Arc<ShutdownSequence>,
    record: RwLock<Option<LicenseRecord>>,
    state: Mutex<MonitorState>,
    tick: Duration,
    driving: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
}

impl LicenseMonitor {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        shutdown: Arc<ShutdownSequence>,
        tick: Duration,
    ) -> Arc<Self> {
        let (shutdown_tx, _) = watch::channel(false);
        Arc::new(Self {
            gateway,
            shutdown,
            record: RwLock::new(None),
            state: Mutex::new(MonitorState::Active),
            tick,
            driving: AtomicBool::new(false),
            shutdown_tx,
        })
    }

    /// Fetch the license record from the backend and arm the monitor with it.
    pub async fn load(&self) -> CoreResult<LicenseRecord> {
        match self.gateway.get_license_info().await {
            Ok(record) => {
                self.set_record(record.clone());
                Ok(record)
            },
            Err(e) => {
                tracing::error!("[Monitor] Failed to fetch license info: {}", e);
                Err(e.into())
            },
        }
    }

    /// Replace the cached record. Re-arms the monitor unless a shutdown is
    /// currently running.
    pub fn set_record(&self, record: LicenseRecord) {
        tracing::info!(
            "[Monitor] Tracking {} license, expires {}",
            record.subscription_type,
            record.expires_at().map_or_else(|| "never (unmapped plan)".to_string(), |t| t.to_rfc3339())
        );
        *self.record.write() = Some(record);
        let mut state = self.state.lock();
        if *state == MonitorState::Terminated {
            *state = MonitorState::Active;
        }
    }

    pub fn record(&self) -> Option<LicenseRecord> {
        self.record.read().clone()
    }

    pub fn state(&self) -> MonitorState {
        *self.state.lock()
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.record.read().as_ref().and_then(|r| remaining_time(r, now))
    }

    pub async fn tick(&self) -> TickOutcome {
        self.tick_at(Utc::now()).await
    }

    /// Evaluate expiry at `now` and fire the shutdown if this is the first
    /// tick to see the license expired.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> TickOutcome {
        let Some(remaining) = self.remaining(now) else {
            return if self.record.read().is_none() {
                TickOutcome::NoRecord
            } else {
                TickOutcome::Unmapped
            };
        };

        if remaining > TimeDelta::zero() {
            return TickOutcome::Valid(remaining);
        }

        {
            let mut state = self.state.lock();
            if *state != MonitorState::Active {
                return TickOutcome::AlreadyFired;
            }
            *state = MonitorState::Expiring;
        }

        tracing::warn!("[Monitor] License expired {}s ago", -remaining.num_seconds());
        let outcome = match self.shutdown.run().await {
            Ok(report) => TickOutcome::Fired(report),
            Err(e) => {
                tracing::warn!("[Monitor] Shutdown not started: {}", e);
                TickOutcome::AlreadyFired
            },
        };

        *self.state.lock() = MonitorState::Terminated;
        outcome
    }

    /// Spawn the 1-second driver. It stops after the shutdown fired or when
    /// [`stop`](Self::stop) is called. Returns `None` while a driver is
    /// already running.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.driving.swap(true, Ordering::AcqRel) {
            tracing::debug!("[Monitor] Driver already running");
            return None;
        }
        let monitor = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(monitor.tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let TickOutcome::Fired(report) = monitor.tick().await {
                            tracing::info!(
                                "[Monitor] Session terminated ({} failed step(s))",
                                report.failures()
                            );
                            break;
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        tracing::info!("[Monitor] License monitor shutting down");
                        break;
                    }
                }
            }
            monitor.driving.store(false, Ordering::Release);
        }))
    }

    pub fn is_running(&self) -> bool {
        self.driving.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::modules::events::{drain, ClientEvent, EventBus};
    use crate::modules::license::tests::record;
    use crate::modules::session::SessionStore;
    use crate::testing::MockGateway;
    use crate::utils::SingleFlight;
    use chrono::TimeZone;
    use errorx_types::ProxyPortStatus;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).single().unwrap()
    }

    fn monitor(mock: &Arc<MockGateway>) -> (Arc<LicenseMonitor>, Arc<SessionStore>, EventBus) {
        let session = Arc::new(SessionStore::new());
        session.login("ABCD-EFGH-IJKL");
        let events = EventBus::new();
        let shutdown = Arc::new(ShutdownSequence::new(
            mock.clone(),
            Arc::clone(&session),
            events.clone(),
            SingleFlight::new(),
        ));
        let monitor = LicenseMonitor::new(mock.clone(), shutdown, Duration::from_secs(1));
        (monitor, session, events)
    }

    #[tokio::test]
    async fn test_one_day_license_fires_once_after_25h() {
        let mock = Arc::new(
            MockGateway::new()
                .with_proxy_status(vec![ProxyPortStatus(18010, true), ProxyPortStatus(18011, false)]),
        );
        let (monitor, session, events) = monitor(&mock);
        let mut rx = events.subscribe();
        monitor.set_record(record("1D", t0()));

        assert!(matches!(monitor.tick_at(t0() + TimeDelta::hours(23)).await, TickOutcome::Valid(_)));

        let now = t0() + TimeDelta::hours(25);
        assert!(matches!(monitor.tick_at(now).await, TickOutcome::Fired(_)));
        for i in 1..=10 {
            let later = now + TimeDelta::seconds(i);
            assert_eq!(monitor.tick_at(later).await, TickOutcome::AlreadyFired);
        }

        assert_eq!(monitor.state(), MonitorState::Terminated);
        assert_eq!(mock.count("stop_proxy"), 1);
        assert_eq!(mock.count("get_system_settings"), 1);
        assert!(!session.is_authenticated());
        let redirects =
            drain(&mut rx).into_iter().filter(|e| *e == ClientEvent::RedirectToLogin).count();
        assert_eq!(redirects, 1);
    }

    #[tokio::test]
    async fn test_unmapped_plan_never_fires() {
        let mock = Arc::new(MockGateway::new());
        let (monitor, _, _) = monitor(&mock);
        monitor.set_record(record("99Y", t0()));

        let outcome = monitor.tick_at(t0() + TimeDelta::days(10_000)).await;
        assert_eq!(outcome, TickOutcome::Unmapped);
        assert_eq!(monitor.state(), MonitorState::Active);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_no_record_is_noop() {
        let mock = Arc::new(MockGateway::new());
        let (monitor, _, _) = monitor(&mock);
        assert_eq!(monitor.tick_at(t0()).await, TickOutcome::NoRecord);
    }

    #[tokio::test]
    async fn test_new_record_rearms() {
        let mock = Arc::new(MockGateway::new());
        let (monitor, _, _) = monitor(&mock);
        monitor.set_record(record("2H", t0()));
        let now = t0() + TimeDelta::hours(3);
        assert!(matches!(monitor.tick_at(now).await, TickOutcome::Fired(_)));

        monitor.set_record(record("7D", now));
        assert_eq!(monitor.state(), MonitorState::Active);
        assert!(matches!(monitor.tick_at(now).await, TickOutcome::Valid(_)));
        assert!(matches!(
            monitor.tick_at(now + TimeDelta::days(8)).await,
            TickOutcome::Fired(_)
        ));
        assert_eq!(mock.count("get_system_settings"), 2);
    }

    #[tokio::test]
    async fn test_load_uses_gateway_record() {
        let mock = Arc::new(MockGateway::new().with_license(record("30D", t0())));
        let (monitor, _, _) = monitor(&mock);
        let loaded = monitor.load().await.unwrap();
        assert_eq!(monitor.record(), Some(loaded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_stops_after_firing() {
        let mock = Arc::new(MockGateway::new());
        let (monitor, session, _) = monitor(&mock);
        // Started long ago, already expired at the first tick
        monitor.set_record(record("2H", Utc::now() - TimeDelta::days(1)));

        let handle = monitor.start().unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(handle.is_finished());
        assert!(!session.is_authenticated());
        assert_eq!(mock.count("get_system_settings"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_stops_on_request() {
        let mock = Arc::new(MockGateway::new());
        let (monitor, _, _) = monitor(&mock);
        monitor.set_record(record("3650D", Utc::now()));

        let handle = monitor.start().unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        monitor.stop();
        handle.await.unwrap();
        assert!(mock.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_reuses_running_driver() {
        let mock = Arc::new(MockGateway::new());
        let (monitor, _, _) = monitor(&mock);
        monitor.set_record(record("3650D", Utc::now()));

        let handle = monitor.start().unwrap();
        assert!(monitor.start().is_none());
        assert!(monitor.is_running());

        monitor.stop();
        handle.await.unwrap();
        assert!(!monitor.is_running());

        let handle = monitor.start().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        monitor.stop();
        handle.await.unwrap();
    }
}
