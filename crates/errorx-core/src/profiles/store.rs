//! Authoritative local copy of the backend's profile set.
//!
//! Local state is only ever replaced by a full re-fetch, never patched.
//! The one exception is dropping a `current` pointer whose profile the
//! backend has already deleted.

use errorx_types::models::RuntimeLogs;
use errorx_types::ProfileSet;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::CoreResult;
use crate::modules::events::{ClientEvent, EventBus};
use crate::modules::gateway::BackendGateway;

pub struct ProfileStore {
    gateway: Arc<dyn BackendGateway>,
    events: EventBus,
    profiles: RwLock<ProfileSet>,
    logs: RwLock<RuntimeLogs>,
}

impl ProfileStore {
    pub fn new(gateway: Arc<dyn BackendGateway>, events: EventBus) -> Self {
        Self {
            gateway,
            events,
            profiles: RwLock::new(ProfileSet::default()),
            logs: RwLock::new(RuntimeLogs::new()),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn BackendGateway> {
        &self.gateway
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn snapshot(&self) -> ProfileSet {
        self.profiles.read().clone()
    }

    pub fn current(&self) -> Option<String> {
        self.profiles.read().current.clone()
    }

    pub fn is_current(&self, uid: &str) -> bool {
        self.profiles.read().is_current(uid)
    }

    pub fn runtime_logs(&self) -> RuntimeLogs {
        self.logs.read().clone()
    }

    /// Re-fetch the whole profile set. A `current` pointing at a missing
    /// profile is dropped before the set is stored.
    pub async fn refresh_profiles(&self) -> CoreResult<ProfileSet> {
        let fresh = self.gateway.get_profiles().await?.normalized();
        *self.profiles.write() = fresh.clone();
        tracing::debug!(
            "[Profiles] Refreshed {} profiles, current {:?}",
            fresh.items.len(),
            fresh.current
        );
        self.events.publish(ClientEvent::ProfilesRefreshed);
        Ok(fresh)
    }

    /// Clear a local `current` that still points at `uid`.
    pub fn forget_current(&self, uid: &str) -> bool {
        let mut profiles = self.profiles.write();
        if !profiles.is_current(uid) {
            return false;
        }
        profiles.current = None;
        drop(profiles);
        self.events.publish(ClientEvent::ProfilesRefreshed);
        true
    }

    pub async fn refresh_logs(&self) -> CoreResult<()> {
        let logs = self.gateway.get_runtime_logs().await?;
        *self.logs.write() = logs;
        Ok(())
    }

    /// Refresh and log failures; callers that continue regardless use this.
    pub async fn refresh_profiles_quietly(&self) {
        if let Err(e) = self.refresh_profiles().await {
            tracing::warn!("[Profiles] Failed to refresh profiles: {}", e);
        }
    }

    pub async fn refresh_logs_quietly(&self) {
        if let Err(e) = self.refresh_logs().await {
            tracing::warn!("[Profiles] Failed to refresh runtime logs: {}", e);
        }
    }
}
