use errorx_types::models::parse_start_time;
use errorx_types::{LicenseError, LicenseRecord, ProfileItem, SubscriptionType};
use serde::{Deserialize, Serialize};

/// Response envelope shared by every service endpoint.
#[derive(Debug, Deserialize, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceInfo {
    pub is_active: bool,
    #[serde(default)]
    pub last_login: Option<String>,
}

/// License document as stored by the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LicenseInfo {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub license_key: String,
    pub start_time: String,
    pub subscription_type: String,
    #[serde(default)]
    pub allowed_platform: String,
    #[serde(default)]
    pub last_activity: String,
    pub windows_device: DeviceInfo,
    #[serde(default)]
    pub android_device: Option<DeviceInfo>,
}

impl LicenseInfo {
    /// Convert into the record cached by the expiry monitor.
    pub fn into_record(self) -> Result<LicenseRecord, LicenseError> {
        let start_time = parse_start_time(&self.start_time)
            .ok_or(LicenseError::InvalidStartTime { value: self.start_time })?;
        Ok(LicenseRecord {
            license_key: self.license_key,
            subscription_type: SubscriptionType::from(self.subscription_type),
            start_time,
            is_device_active: self.windows_device.is_active,
            allowed_platform: self.allowed_platform,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ValidateRequest<'a> {
    pub key: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ImportRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRequest<'a> {
    pub item: &'a ProfileItem,
    pub content: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReorderRequest<'a> {
    pub active: &'a str,
    pub over: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CurrentRequest<'a> {
    pub current: &'a str,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct SystemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_system_proxy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_tun_mode: Option<bool>,
}
