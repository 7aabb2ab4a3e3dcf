//! [`BackendGateway`] over the local ErrorX HTTP service.

use async_trait::async_trait;
use errorx_client::ServiceClient;
use errorx_types::models::RuntimeLogs;
use errorx_types::{
    ClientConfig, GatewayError, LicenseRecord, ProfileItem, ProfileSet, ProxyPortStatus,
    ServerSummary, SystemSettings,
};

use super::gateway::{BackendGateway, GatewayResult};

pub struct HttpGateway {
    client: ServiceClient,
}

impl HttpGateway {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ClientConfig) -> GatewayResult<Self> {
        let client = ServiceClient::new(&config.service_url, config.api_timeout_secs)?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn validate_license(&self, key: &str) -> GatewayResult<bool> {
        Ok(self.client.validate_license(key).await?)
    }

    async fn get_license_info(&self) -> GatewayResult<LicenseRecord> {
        let info = self.client.get_license_info().await?;
        info.into_record().map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    async fn get_proxy_status(&self) -> GatewayResult<Vec<ProxyPortStatus>> {
        Ok(self.client.get_proxy_status().await?)
    }

    async fn start_proxy(&self) -> GatewayResult<()> {
        Ok(self.client.start_proxy().await?)
    }

    async fn stop_proxy(&self) -> GatewayResult<()> {
        Ok(self.client.stop_proxy().await?)
    }

    async fn get_server_list(&self) -> GatewayResult<ServerSummary> {
        Ok(self.client.get_server_list().await?)
    }

    async fn get_system_settings(&self) -> GatewayResult<SystemSettings> {
        Ok(self.client.get_system_settings().await?)
    }

    async fn set_system_proxy_enabled(&self, enabled: bool) -> GatewayResult<()> {
        Ok(self.client.set_system_proxy_enabled(enabled).await?)
    }

    async fn set_tun_mode_enabled(&self, enabled: bool) -> GatewayResult<()> {
        Ok(self.client.set_tun_mode_enabled(enabled).await?)
    }

    async fn import_profile(&self, url: &str) -> GatewayResult<()> {
        Ok(self.client.import_profile(url).await?)
    }

    async fn create_profile(
        &self,
        item: &ProfileItem,
        content: Option<&str>,
    ) -> GatewayResult<()> {
        Ok(self.client.create_profile(item, content).await?)
    }

    async fn update_profile(&self, uid: &str) -> GatewayResult<()> {
        Ok(self.client.update_profile(uid).await?)
    }

    async fn delete_profile(&self, uid: &str) -> GatewayResult<()> {
        Ok(self.client.delete_profile(uid).await?)
    }

    async fn reorder_profile(&self, active: &str, over: &str) -> GatewayResult<()> {
        Ok(self.client.reorder_profile(active, over).await?)
    }

    async fn patch_current(&self, uid: &str) -> GatewayResult<bool> {
        Ok(self.client.patch_current(uid).await?)
    }

    async fn get_profiles(&self) -> GatewayResult<ProfileSet> {
        Ok(self.client.get_profiles().await?)
    }

    async fn enhance_profiles(&self) -> GatewayResult<()> {
        Ok(self.client.enhance_profiles().await?)
    }

    async fn activate_selected(&self) -> GatewayResult<()> {
        Ok(self.client.activate_selected().await?)
    }

    async fn get_runtime_logs(&self) -> GatewayResult<RuntimeLogs> {
        Ok(self.client.get_runtime_logs().await?)
    }

    async fn close_all_connections(&self) -> GatewayResult<()> {
        Ok(self.client.close_all_connections().await?)
    }

    async fn hide_tray(&self) -> GatewayResult<()> {
        Ok(self.client.hide_tray().await?)
    }

    async fn show_tray(&self) -> GatewayResult<()> {
        Ok(self.client.show_tray().await?)
    }

    async fn exit_app(&self) -> GatewayResult<()> {
        Ok(self.client.exit_app().await?)
    }
}
