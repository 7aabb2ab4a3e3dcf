use crate::error::ClientError;
use crate::types::*;
use errorx_types::models::RuntimeLogs;
use errorx_types::{ProfileItem, ProfileSet, ProxyPortStatus, ServerSummary, SystemSettings};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::time::Duration;
use url::Url;

/// Client for the ErrorX service running on the loopback interface.
#[derive(Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: Url,
}

impl ServiceClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        // The service is local; never route it through the system proxy we toggle.
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client, base_url: Url::parse(base_url)? })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base_url.join(path)?;
        Ok(self.client.request(method, url))
    }

    /// `/api/profiles/{uid}[/{action}]`, with `uid` encoded as a single segment.
    fn profile_request(
        &self,
        method: Method,
        uid: &str,
        action: Option<&str>,
    ) -> Result<RequestBuilder, ClientError> {
        if matches!(uid, "" | "." | "..") {
            return Err(ClientError::InvalidPath(format!("profile uid {:?}", uid)));
        }
        let mut url = self.base_url.join("/api/profiles/")?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ClientError::InvalidPath(self.base_url.to_string()))?;
            segments.pop_if_empty().push(uid);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(self.client.request(method, url))
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ClientError> {
        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        let envelope: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            ClientError::InvalidResponse(format!("HTTP {}: {} ({})", status.as_u16(), e, body))
        })?;
        if envelope.code != 0 {
            return Err(ClientError::Api { code: envelope.code, message: envelope.msg });
        }
        Ok(envelope)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &'static str,
    ) -> Result<T, ClientError> {
        self.envelope(request).await?.data.ok_or(ClientError::MissingData(what))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(), ClientError> {
        self.envelope::<IgnoredAny>(request).await.map(|_| ())
    }

    // ===== License =====

    pub async fn validate_license(&self, key: &str) -> Result<bool, ClientError> {
        let req = self.request(Method::POST, "/api/license/validate")?.json(&ValidateRequest { key });
        Ok(self.envelope::<bool>(req).await?.data.unwrap_or(false))
    }

    pub async fn get_license_info(&self) -> Result<LicenseInfo, ClientError> {
        self.fetch(self.request(Method::GET, "/api/license/info")?, "license info").await
    }

    // ===== Proxy servers =====

    pub async fn get_server_list(&self) -> Result<ServerSummary, ClientError> {
        self.fetch(self.request(Method::GET, "/api/servers")?, "server info").await
    }

    pub async fn start_proxy(&self) -> Result<(), ClientError> {
        self.execute(self.request(Method::POST, "/api/proxy/start")?).await
    }

    pub async fn stop_proxy(&self) -> Result<(), ClientError> {
        self.execute(self.request(Method::POST, "/api/proxy/stop")?).await
    }

    pub async fn get_proxy_status(&self) -> Result<Vec<ProxyPortStatus>, ClientError> {
        let req = self.request(Method::GET, "/api/proxy/status")?;
        Ok(self.envelope(req).await?.data.unwrap_or_default())
    }

    // ===== System integration =====

    pub async fn get_system_settings(&self) -> Result<SystemSettings, ClientError> {
        self.fetch(self.request(Method::GET, "/api/settings/system")?, "system settings").await
    }

    pub async fn set_system_proxy_enabled(&self, enabled: bool) -> Result<(), ClientError> {
        let patch = SystemPatch { enable_system_proxy: Some(enabled), ..Default::default() };
        self.execute(self.request(Method::PATCH, "/api/settings/system")?.json(&patch)).await
    }

    pub async fn set_tun_mode_enabled(&self, enabled: bool) -> Result<(), ClientError> {
        let patch = SystemPatch { enable_tun_mode: Some(enabled), ..Default::default() };
        self.execute(self.request(Method::PATCH, "/api/settings/system")?.json(&patch)).await
    }

    // ===== Profiles =====

    pub async fn get_profiles(&self) -> Result<ProfileSet, ClientError> {
        self.fetch(self.request(Method::GET, "/api/profiles")?, "profiles").await
    }

    pub async fn import_profile(&self, url: &str) -> Result<(), ClientError> {
        let req = self.request(Method::POST, "/api/profiles/import")?.json(&ImportRequest { url });
        self.execute(req).await
    }

    pub async fn create_profile(
        &self,
        item: &ProfileItem,
        content: Option<&str>,
    ) -> Result<(), ClientError> {
        let req = self.request(Method::POST, "/api/profiles")?.json(&CreateRequest { item, content });
        self.execute(req).await
    }

    pub async fn update_profile(&self, uid: &str) -> Result<(), ClientError> {
        self.execute(self.profile_request(Method::POST, uid, Some("update"))?).await
    }

    pub async fn delete_profile(&self, uid: &str) -> Result<(), ClientError> {
        self.execute(self.profile_request(Method::DELETE, uid, None)?).await
    }

    pub async fn reorder_profile(&self, active: &str, over: &str) -> Result<(), ClientError> {
        let req = self
            .request(Method::POST, "/api/profiles/reorder")?
            .json(&ReorderRequest { active, over });
        self.execute(req).await
    }

    /// Point `current` at `uid`; the service answers whether anything changed.
    pub async fn patch_current(&self, uid: &str) -> Result<bool, ClientError> {
        let req = self
            .request(Method::PATCH, "/api/profiles/current")?
            .json(&CurrentRequest { current: uid });
        Ok(self.envelope::<bool>(req).await?.data.unwrap_or(true))
    }

    pub async fn enhance_profiles(&self) -> Result<(), ClientError> {
        self.execute(self.request(Method::POST, "/api/profiles/enhance")?).await
    }

    pub async fn activate_selected(&self) -> Result<(), ClientError> {
        self.execute(self.request(Method::POST, "/api/profiles/activate-selected")?).await
    }

    pub async fn get_runtime_logs(&self) -> Result<RuntimeLogs, ClientError> {
        let req = self.request(Method::GET, "/api/runtime/logs")?;
        Ok(self.envelope(req).await?.data.unwrap_or_default())
    }

    pub async fn close_all_connections(&self) -> Result<(), ClientError> {
        self.execute(self.request(Method::DELETE, "/api/connections")?).await
    }

    // ===== Window / tray =====

    pub async fn hide_tray(&self) -> Result<(), ClientError> {
        self.execute(self.request(Method::POST, "/api/tray/hide")?).await
    }

    pub async fn show_tray(&self) -> Result<(), ClientError> {
        self.execute(self.request(Method::POST, "/api/tray/show")?).await
    }

    pub async fn exit_app(&self) -> Result<(), ClientError> {
        tracing::info!("Requesting application exit");
        self.execute(self.request(Method::POST, "/api/app/exit")?).await
    }
}
