//! Client context
//!
//! Owns one instance of every orchestration component and wires them to a
//! shared gateway, event bus and single-flight registry.

use errorx_types::{ClientConfig, LicenseRecord, SessionCredentials};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::CoreResult;
use crate::modules::events::{ClientEvent, EventBus};
use crate::modules::gateway::BackendGateway;
use crate::modules::http_gateway::HttpGateway;
use crate::modules::login::LoginGate;
use crate::modules::monitor::LicenseMonitor;
use crate::modules::proxy_panel::ProxyPanel;
use crate::modules::session::SessionStore;
use crate::modules::shutdown::ShutdownSequence;
use crate::profiles::ProfileOrchestrator;
use crate::utils::SingleFlight;

pub struct ClientContext {
    config: ClientConfig,
    gateway: Arc<dyn BackendGateway>,
    events: EventBus,
    session: Arc<SessionStore>,
    login: LoginGate,
    shutdown: Arc<ShutdownSequence>,
    monitor: Arc<LicenseMonitor>,
    profiles: ProfileOrchestrator,
    proxy: Arc<ProxyPanel>,
}

impl ClientContext {
    pub fn new(config: ClientConfig, gateway: Arc<dyn BackendGateway>) -> Self {
        let events = EventBus::new();
        let flights = SingleFlight::new();
        let session = Arc::new(SessionStore::new());

        let login = LoginGate::new(
            Arc::clone(&gateway),
            Arc::clone(&session),
            events.clone(),
            flights.clone(),
        );
        let shutdown = Arc::new(ShutdownSequence::new(
            Arc::clone(&gateway),
            Arc::clone(&session),
            events.clone(),
            flights.clone(),
        ));
        let monitor = LicenseMonitor::new(
            Arc::clone(&gateway),
            Arc::clone(&shutdown),
            Duration::from_millis(config.license_tick_ms),
        );
        let profiles =
            ProfileOrchestrator::new(Arc::clone(&gateway), events.clone(), flights, &config);
        let proxy = ProxyPanel::new(Arc::clone(&gateway), Duration::from_secs(config.proxy_poll_secs));

        Self { config, gateway, events, session, login, shutdown, monitor, profiles, proxy }
    }

    /// Build a context backed by the HTTP service at `config.service_url`.
    pub fn connect(config: ClientConfig) -> CoreResult<Self> {
        let gateway = HttpGateway::from_config(&config)?;
        tracing::info!("Using ErrorX service at {}", config.service_url);
        Ok(Self::new(config, Arc::new(gateway)))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn gateway(&self) -> &Arc<dyn BackendGateway> {
        &self.gateway
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn login(&self) -> &LoginGate {
        &self.login
    }

    pub fn shutdown(&self) -> &Arc<ShutdownSequence> {
        &self.shutdown
    }

    pub fn monitor(&self) -> &Arc<LicenseMonitor> {
        &self.monitor
    }

    pub fn profiles(&self) -> &ProfileOrchestrator {
        &self.profiles
    }

    pub fn proxy(&self) -> &Arc<ProxyPanel> {
        &self.proxy
    }

    /// Validate `key` and, on success, prepare the home screen state.
    pub async fn sign_in(&self, key: &str) -> CoreResult<SessionCredentials> {
        let credentials = self.login.submit(key).await?;
        self.login.leave().await;
        Ok(credentials)
    }

    /// Load license and profile state for an authenticated session and
    /// start the background drivers.
    ///
    /// Returns the license record together with the monitor and proxy poll
    /// handles. Profile and proxy loading failures are logged, not returned.
    pub async fn open_home(&self) -> CoreResult<SessionHandles> {
        self.session.require_auth()?;
        let record = self.monitor.load().await?;

        if let Err(e) = self.profiles.refresh().await {
            tracing::warn!("Could not load profiles: {}", e);
        }
        if let Err(e) = self.proxy.refresh().await {
            tracing::warn!("Could not load proxy status: {}", e);
        }

        Ok(SessionHandles {
            record,
            monitor: self.monitor.start(),
            proxy_poll: self.proxy.start_polling(),
        })
    }

    /// Stop background drivers and return to the login screen.
    pub async fn sign_out(&self) {
        self.monitor.stop();
        self.proxy.stop_polling();
        self.login.enter().await;
        self.events.publish(ClientEvent::RedirectToLogin);
    }
}

/// Background tasks owned by an open session.
pub struct SessionHandles {
    pub record: LicenseRecord,
    /// `None` when a license driver was already running.
    pub monitor: Option<JoinHandle<()>>,
    pub proxy_poll: JoinHandle<()>,
}
