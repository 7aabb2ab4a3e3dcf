//! Backend gateway trait for service abstraction.

use async_trait::async_trait;
use errorx_types::models::RuntimeLogs;
use errorx_types::{
    GatewayError, LicenseRecord, ProfileItem, ProfileSet, ProxyPortStatus, ServerSummary,
    SystemSettings,
};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Every backend operation the orchestration core consumes.
///
/// Any call may fail or take unbounded time; callers never assume a
/// deadline beyond what the implementation enforces at transport level.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    // License
    async fn validate_license(&self, key: &str) -> GatewayResult<bool>;
    async fn get_license_info(&self) -> GatewayResult<LicenseRecord>;

    // Proxy servers
    async fn get_proxy_status(&self) -> GatewayResult<Vec<ProxyPortStatus>>;
    async fn start_proxy(&self) -> GatewayResult<()>;
    async fn stop_proxy(&self) -> GatewayResult<()>;
    async fn get_server_list(&self) -> GatewayResult<ServerSummary>;

    // System integration
    async fn get_system_settings(&self) -> GatewayResult<SystemSettings>;
    async fn set_system_proxy_enabled(&self, enabled: bool) -> GatewayResult<()>;
    async fn set_tun_mode_enabled(&self, enabled: bool) -> GatewayResult<()>;

    // Profiles
    async fn import_profile(&self, url: &str) -> GatewayResult<()>;
    async fn create_profile(&self, item: &ProfileItem, content: Option<&str>)
        -> GatewayResult<()>;
    async fn update_profile(&self, uid: &str) -> GatewayResult<()>;
    async fn delete_profile(&self, uid: &str) -> GatewayResult<()>;
    async fn reorder_profile(&self, active: &str, over: &str) -> GatewayResult<()>;
    /// Point `current` at `uid`. Returns whether the backend changed anything.
    async fn patch_current(&self, uid: &str) -> GatewayResult<bool>;
    async fn get_profiles(&self) -> GatewayResult<ProfileSet>;
    async fn enhance_profiles(&self) -> GatewayResult<()>;
    async fn activate_selected(&self) -> GatewayResult<()>;
    async fn get_runtime_logs(&self) -> GatewayResult<RuntimeLogs>;
    async fn close_all_connections(&self) -> GatewayResult<()>;

    // Window / tray
    async fn hide_tray(&self) -> GatewayResult<()>;
    async fn show_tray(&self) -> GatewayResult<()>;
    async fn exit_app(&self) -> GatewayResult<()>;
}
