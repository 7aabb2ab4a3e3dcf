//! Local proxy server status and control.

use errorx_types::{ProxyPortStatus, ServerSummary};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::gateway::BackendGateway;
use crate::error::CoreResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProxySnapshot {
    pub servers: ServerSummary,
    pub ports: Vec<ProxyPortStatus>,
}

impl ProxySnapshot {
    pub fn is_running(&self) -> bool {
        self.ports.iter().any(ProxyPortStatus::is_running)
    }

    pub fn running_ports(&self) -> usize {
        self.ports.iter().filter(|p| p.is_running()).count()
    }
}

pub struct ProxyPanel {
    gateway: Arc<dyn BackendGateway>,
    snapshot: RwLock<Option<ProxySnapshot>>,
    poll_interval: Duration,
    shutdown_tx: watch::Sender<bool>,
}

impl ProxyPanel {
    pub fn new(gateway: Arc<dyn BackendGateway>, poll_interval: Duration) -> Arc<Self> {
        let (shutdown_tx, _) = watch::channel(false);
        Arc::new(Self { gateway, snapshot: RwLock::new(None), poll_interval, shutdown_tx })
    }

    /// Fetch server list and port status concurrently.
    pub async fn refresh(&self) -> CoreResult<ProxySnapshot> {
        let (servers, ports) =
            tokio::try_join!(self.gateway.get_server_list(), self.gateway.get_proxy_status())?;
        let snapshot = ProxySnapshot { servers, ports };
        *self.snapshot.write() = Some(snapshot.clone());
        Ok(snapshot)
    }

    pub fn snapshot(&self) -> Option<ProxySnapshot> {
        self.snapshot.read().clone()
    }

    pub fn is_running(&self) -> bool {
        self.snapshot.read().as_ref().is_some_and(ProxySnapshot::is_running)
    }

    pub async fn start(&self) -> CoreResult<ProxySnapshot> {
        if let Err(e) = self.gateway.start_proxy().await {
            tracing::error!("Failed to start proxy servers: {}", e);
            return Err(e.into());
        }
        tracing::info!("Proxy servers started");
        self.refresh().await
    }

    pub async fn stop(&self) -> CoreResult<ProxySnapshot> {
        if let Err(e) = self.gateway.stop_proxy().await {
            tracing::error!("Failed to stop proxy servers: {}", e);
            return Err(e.into());
        }
        tracing::info!("Proxy servers stopped");
        self.refresh().await
    }

    /// Refresh on a fixed interval until [`stop_polling`](Self::stop_polling).
    pub fn start_polling(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let panel = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tokio::time::sleep(panel.poll_interval) => {
                        if let Err(e) = panel.refresh().await {
                            tracing::debug!("Proxy status poll failed: {}", e);
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        tracing::debug!("Proxy status polling stopped");
                        break;
                    }
                }
            }
        })
    }

    pub fn stop_polling(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::MockGateway;
    use errorx_types::GatewayError;

    #[tokio::test]
    async fn test_refresh_combines_both_calls() {
        let mock = Arc::new(
            MockGateway::new()
                .with_proxy_status(vec![ProxyPortStatus(18010, true), ProxyPortStatus(18011, false)]),
        );
        let panel = ProxyPanel::new(mock.clone(), Duration::from_secs(5));

        let snapshot = panel.refresh().await.unwrap();
        assert!(snapshot.is_running());
        assert_eq!(snapshot.running_ports(), 1);
        assert!(panel.is_running());
        assert_eq!(mock.count("get_server_list"), 1);
        assert_eq!(mock.count("get_proxy_status"), 1);
    }

    #[tokio::test]
    async fn test_failed_start_keeps_old_snapshot() {
        let mock = Arc::new(MockGateway::new());
        mock.fail("start_proxy", GatewayError::Rejected("port in use".into()));
        let panel = ProxyPanel::new(mock.clone(), Duration::from_secs(5));

        assert!(panel.start().await.is_err());
        assert_eq!(panel.snapshot(), None);
        assert_eq!(mock.count("get_proxy_status"), 0);
    }

    #[tokio::test]
    async fn test_start_then_stop() {
        let mock = Arc::new(MockGateway::new().with_proxy_status(vec![ProxyPortStatus(18010, false)]));
        let panel = ProxyPanel::new(mock.clone(), Duration::from_secs(5));

        assert!(panel.start().await.unwrap().is_running());
        assert!(!panel.stop().await.unwrap().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_refreshes_until_stopped() {
        let mock = Arc::new(MockGateway::new());
        let panel = ProxyPanel::new(mock.clone(), Duration::from_secs(5));

        let handle = panel.start_polling();
        tokio::time::sleep(Duration::from_secs(16)).await;
        panel.stop_polling();
        handle.await.unwrap();
        assert_eq!(mock.count("get_proxy_status"), 3);
    }
}
