//! Client configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Tunables for the orchestration core and the service client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ClientConfig {
    /// Base URL of the local ErrorX service
    #[validate(url)]
    #[serde(default = "default_service_url")]
    pub service_url: String,
    /// Per-request timeout applied by the HTTP client
    #[validate(range(min = 1_u64, max = 600_u64))]
    #[serde(default = "default_api_timeout_secs")]
    pub api_timeout_secs: u64,
    /// License expiry check cadence
    #[validate(range(min = 100_u64, max = 60_000_u64))]
    #[serde(default = "default_license_tick_ms")]
    pub license_tick_ms: u64,
    /// Delay before a profile shows as activating
    #[validate(range(max = 5_000_u64))]
    #[serde(default = "default_activation_debounce_ms")]
    pub activation_debounce_ms: u64,
    /// Minimum spacing between profile list refreshes during batch updates
    #[validate(range(min = 100_u64, max = 60_000_u64))]
    #[serde(default = "default_refresh_throttle_ms")]
    pub refresh_throttle_ms: u64,
    /// Proxy server status polling interval
    #[validate(range(min = 1_u64, max = 3600_u64))]
    #[serde(default = "default_proxy_poll_secs")]
    pub proxy_poll_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            api_timeout_secs: default_api_timeout_secs(),
            license_tick_ms: default_license_tick_ms(),
            activation_debounce_ms: default_activation_debounce_ms(),
            refresh_throttle_ms: default_refresh_throttle_ms(),
            proxy_poll_secs: default_proxy_poll_secs(),
        }
    }
}

pub fn default_service_url() -> String {
    "http://127.0.0.1:33211".to_string()
}

pub const fn default_api_timeout_secs() -> u64 {
    30
}

pub const fn default_license_tick_ms() -> u64 {
    1000
}

pub const fn default_activation_debounce_ms() -> u64 {
    100
}

pub const fn default_refresh_throttle_ms() -> u64 {
    2000
}

pub const fn default_proxy_poll_secs() -> u64 {
    5
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: ClientConfig =
            serde_json::from_str(r#"{"service_url":"http://127.0.0.1:40000"}"#).unwrap();
        assert_eq!(cfg.service_url, "http://127.0.0.1:40000");
        assert_eq!(cfg.refresh_throttle_ms, 2000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_tick() {
        let cfg = ClientConfig { license_tick_ms: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
