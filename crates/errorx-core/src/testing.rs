//! In-memory [`BackendGateway`] for tests.
//!
//! Keeps a small model of backend state (profiles, ports, toggles) and
//! records every call in order. Failures and latency can be injected per
//! operation name.

use async_trait::async_trait;
use errorx_types::models::RuntimeLogs;
use errorx_types::{
    GatewayError, LicenseRecord, Profile, ProfileItem, ProfileKind, ProfileSet, ProxyPortStatus,
    ServerSummary, SystemSettings,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::modules::gateway::{BackendGateway, GatewayResult};

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub arg: Option<String>,
}

#[derive(Default)]
struct MockState {
    profiles: ProfileSet,
    license: Option<LicenseRecord>,
    settings: SystemSettings,
    ports: Vec<ProxyPortStatus>,
    valid_keys: HashSet<String>,
    created: Vec<(ProfileItem, Option<String>)>,
    next_uid: u32,
}

#[derive(Default)]
pub struct MockGateway {
    state: Mutex<MockState>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<(&'static str, Option<String>), GatewayError>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
}

/// Profile with a readable name derived from `uid`.
pub fn profile(uid: &str, kind: ProfileKind) -> Profile {
    Profile {
        uid: uid.to_string(),
        kind,
        name: uid.to_uppercase(),
        desc: None,
        url: None,
        updated: None,
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Builders =====

    #[must_use]
    pub fn with_profiles(self, profiles: ProfileSet) -> Self {
        self.state.lock().profiles = profiles;
        self
    }

    #[must_use]
    pub fn with_license(self, record: LicenseRecord) -> Self {
        self.state.lock().license = Some(record);
        self
    }

    #[must_use]
    pub fn with_settings(self, settings: SystemSettings) -> Self {
        self.state.lock().settings = settings;
        self
    }

    #[must_use]
    pub fn with_proxy_status(self, ports: Vec<ProxyPortStatus>) -> Self {
        self.state.lock().ports = ports;
        self
    }

    #[must_use]
    pub fn with_valid_key(self, key: &str) -> Self {
        self.state.lock().valid_keys.insert(key.to_string());
        self
    }

    // ===== Injection =====

    /// Make every call to `op` fail with `err` until [`heal`](Self::heal).
    pub fn fail(&self, op: &'static str, err: GatewayError) {
        self.failures.lock().insert((op, None), err);
    }

    /// Make calls to `op` for one `uid` fail.
    pub fn fail_uid(&self, op: &'static str, uid: &str, err: GatewayError) {
        self.failures.lock().insert((op, Some(uid.to_string())), err);
    }

    pub fn heal(&self, op: &'static str) {
        self.failures.lock().retain(|(o, _), _| *o != op);
    }

    /// Delay every call to `op` by `delay` before it takes effect.
    pub fn delay(&self, op: &'static str, delay: Duration) {
        self.delays.lock().insert(op, delay);
    }

    // ===== Inspection =====

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_ops(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(|c| c.op).collect()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.op == op).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn profiles(&self) -> ProfileSet {
        self.state.lock().profiles.clone()
    }

    pub fn created(&self) -> Vec<(ProfileItem, Option<String>)> {
        self.state.lock().created.clone()
    }

    pub fn settings(&self) -> SystemSettings {
        self.state.lock().settings
    }

    // ===== Internals =====

    async fn enter(&self, op: &'static str, arg: Option<&str>) -> GatewayResult<()> {
        self.calls.lock().push(Call { op, arg: arg.map(str::to_string) });

        let delay = self.delays.lock().get(op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failures = self.failures.lock();
        if let Some(err) = failures.get(&(op, None)) {
            return Err(err.clone());
        }
        if let Some(err) = arg.and_then(|a| failures.get(&(op, Some(a.to_string())))) {
            return Err(err.clone());
        }
        Ok(())
    }

    fn not_found(uid: &str) -> GatewayError {
        GatewayError::Rejected(format!("profile not found: {uid}"))
    }
}

#[async_trait]
impl BackendGateway for MockGateway {
    async fn validate_license(&self, key: &str) -> GatewayResult<bool> {
        self.enter("validate_license", Some(key)).await?;
        Ok(self.state.lock().valid_keys.contains(key))
    }

    async fn get_license_info(&self) -> GatewayResult<LicenseRecord> {
        self.enter("get_license_info", None).await?;
        self.state
            .lock()
            .license
            .clone()
            .ok_or_else(|| GatewayError::MissingData("license info".to_string()))
    }

    async fn get_proxy_status(&self) -> GatewayResult<Vec<ProxyPortStatus>> {
        self.enter("get_proxy_status", None).await?;
        Ok(self.state.lock().ports.clone())
    }

    async fn start_proxy(&self) -> GatewayResult<()> {
        self.enter("start_proxy", None).await?;
        for port in &mut self.state.lock().ports {
            port.1 = true;
        }
        Ok(())
    }

    async fn stop_proxy(&self) -> GatewayResult<()> {
        self.enter("stop_proxy", None).await?;
        for port in &mut self.state.lock().ports {
            port.1 = false;
        }
        Ok(())
    }

    async fn get_server_list(&self) -> GatewayResult<ServerSummary> {
        self.enter("get_server_list", None).await?;
        let ports = self.state.lock().ports.len() as i32;
        Ok(ServerSummary { servers: Vec::new(), total_servers: ports, live_servers: ports, reserved_servers: 0 })
    }

    async fn get_system_settings(&self) -> GatewayResult<SystemSettings> {
        self.enter("get_system_settings", None).await?;
        Ok(self.state.lock().settings)
    }

    async fn set_system_proxy_enabled(&self, enabled: bool) -> GatewayResult<()> {
        self.enter("set_system_proxy_enabled", Some(&enabled.to_string())).await?;
        self.state.lock().settings.enable_system_proxy = enabled;
        Ok(())
    }

    async fn set_tun_mode_enabled(&self, enabled: bool) -> GatewayResult<()> {
        self.enter("set_tun_mode_enabled", Some(&enabled.to_string())).await?;
        self.state.lock().settings.enable_tun_mode = enabled;
        Ok(())
    }

    async fn import_profile(&self, url: &str) -> GatewayResult<()> {
        self.enter("import_profile", Some(url)).await?;
        let mut state = self.state.lock();
        state.next_uid += 1;
        let uid = format!("R{}", state.next_uid);
        let mut imported = profile(&uid, ProfileKind::Remote);
        imported.url = Some(url.to_string());
        state.profiles.items.push(imported);
        Ok(())
    }

    async fn create_profile(&self, item: &ProfileItem, content: Option<&str>) -> GatewayResult<()> {
        self.enter("create_profile", Some(&item.name)).await?;
        let mut state = self.state.lock();
        state.next_uid += 1;
        let uid = format!("L{}", state.next_uid);
        let mut created = profile(&uid, item.kind);
        created.name = item.name.clone();
        state.profiles.items.push(created);
        state.created.push((item.clone(), content.map(str::to_string)));
        Ok(())
    }

    async fn update_profile(&self, uid: &str) -> GatewayResult<()> {
        self.enter("update_profile", Some(uid)).await?;
        let mut state = self.state.lock();
        let profile = state.profiles.items.iter_mut().find(|p| p.uid == uid).ok_or_else(|| Self::not_found(uid))?;
        profile.updated = Some(profile.updated.unwrap_or(0) + 1);
        Ok(())
    }

    async fn delete_profile(&self, uid: &str) -> GatewayResult<()> {
        self.enter("delete_profile", Some(uid)).await?;
        let mut state = self.state.lock();
        let before = state.profiles.items.len();
        state.profiles.items.retain(|p| p.uid != uid);
        if state.profiles.items.len() == before {
            return Err(Self::not_found(uid));
        }
        if state.profiles.is_current(uid) {
            state.profiles.current = None;
        }
        Ok(())
    }

    async fn reorder_profile(&self, active: &str, over: &str) -> GatewayResult<()> {
        self.enter("reorder_profile", Some(&format!("{active}->{over}"))).await?;
        let mut state = self.state.lock();
        let items = &mut state.profiles.items;
        let from = items.iter().position(|p| p.uid == active).ok_or_else(|| Self::not_found(active))?;
        let to = items.iter().position(|p| p.uid == over).ok_or_else(|| Self::not_found(over))?;
        let moved = items.remove(from);
        items.insert(to, moved);
        Ok(())
    }

    async fn patch_current(&self, uid: &str) -> GatewayResult<bool> {
        self.enter("patch_current", Some(uid)).await?;
        let mut state = self.state.lock();
        if state.profiles.get(uid).is_none() {
            return Err(Self::not_found(uid));
        }
        let changed = !state.profiles.is_current(uid);
        state.profiles.current = Some(uid.to_string());
        Ok(changed)
    }

    async fn get_profiles(&self) -> GatewayResult<ProfileSet> {
        self.enter("get_profiles", None).await?;
        Ok(self.state.lock().profiles.clone())
    }

    async fn enhance_profiles(&self) -> GatewayResult<()> {
        let current = self.state.lock().profiles.current.clone();
        self.enter("enhance_profiles", current.as_deref()).await
    }

    async fn activate_selected(&self) -> GatewayResult<()> {
        self.enter("activate_selected", None).await
    }

    async fn get_runtime_logs(&self) -> GatewayResult<RuntimeLogs> {
        self.enter("get_runtime_logs", None).await?;
        Ok(RuntimeLogs::new())
    }

    async fn close_all_connections(&self) -> GatewayResult<()> {
        self.enter("close_all_connections", None).await
    }

    async fn hide_tray(&self) -> GatewayResult<()> {
        self.enter("hide_tray", None).await
    }

    async fn show_tray(&self) -> GatewayResult<()> {
        self.enter("show_tray", None).await
    }

    async fn exit_app(&self) -> GatewayResult<()> {
        self.enter("exit_app", None).await
    }
}
