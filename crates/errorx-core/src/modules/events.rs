//! Broadcast bus for notices and navigation events.

use errorx_types::Notice;
use serde::Serialize;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 256;

/// Events emitted by the orchestration core toward whatever presents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Transient user notice.
    Notice(Notice),
    /// Session ended; the presenter must return to the login boundary.
    RedirectToLogin,
    /// Login succeeded.
    NavigateHome,
    /// Cached profile set was replaced by a fresh fetch.
    ProfilesRefreshed,
    /// Cosmetic activating set changed.
    ActivatingChanged(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Publish to current subscribers. Events with no listener are dropped.
    pub fn publish(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }

    pub fn notify(&self, notice: Notice) {
        tracing::debug!("Notice [{:?}] {}", notice.level, notice.message);
        self.publish(ClientEvent::Notice(notice));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain everything currently buffered in `rx` without waiting.
pub fn drain(rx: &mut broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!("Event receiver lagged, {} events skipped", skipped);
            },
            Err(_) => break,
        }
    }
    events
}

/// Notices contained in `events`, in order.
pub fn notices(events: &[ClientEvent]) -> Vec<&Notice> {
    events
        .iter()
        .filter_map(|e| match e {
            ClientEvent::Notice(n) => Some(n),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.notify(Notice::info("nobody listening"));
    }

    #[test]
    fn test_drain_returns_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.publish(ClientEvent::NavigateHome);
        bus.notify(Notice::success("ok"));
        bus.publish(ClientEvent::RedirectToLogin);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ClientEvent::NavigateHome);
        assert_eq!(notices(&events)[0].message, "ok");
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_event_wire_shape() {
        let json = serde_json::to_value(ClientEvent::ActivatingChanged(vec!["a".into()]))
            .unwrap_or_default();
        assert_eq!(json, serde_json::json!({ "type": "activating_changed", "payload": ["a"] }));
    }
}
