use errorx_types::ClientConfig;
use std::fs;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{CoreError, CoreResult};

const DATA_DIR: &str = ".errorx";
const CONFIG_FILE: &str = "client_config.json";

/// Get the data directory path, creating it when missing.
///
/// `ERRORX_DATA_DIR` overrides the default `~/.errorx`.
pub fn get_data_dir() -> CoreResult<PathBuf> {
    let data_dir = if let Ok(custom_dir) = std::env::var("ERRORX_DATA_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Config("Cannot get home directory".to_string()))?;
        home.join(DATA_DIR)
    };

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}

/// Load the client configuration from the data directory, applying
/// environment overrides.
pub fn load_config() -> CoreResult<ClientConfig> {
    let mut config = load_config_from(&get_data_dir()?)?;
    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Load `client_config.json` from `dir`. A missing file yields defaults.
pub fn load_config_from(dir: &Path) -> CoreResult<ClientConfig> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(ClientConfig::default());
    }

    let content = fs::read_to_string(&config_path)?;
    let config: ClientConfig = serde_json::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Write `client_config.json` atomically (temp file + rename).
pub fn save_config_to(dir: &Path, config: &ClientConfig) -> CoreResult<()> {
    validate(config)?;
    let config_path = dir.join(CONFIG_FILE);
    let temp_path = dir.join(format!("{}.tmp", CONFIG_FILE));

    let content = serde_json::to_string_pretty(config)?;
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, &config_path)?;
    Ok(())
}

/// Update specific fields in the config stored in `dir`.
pub fn update_config_in<F>(dir: &Path, updater: F) -> CoreResult<ClientConfig>
where
    F: FnOnce(&mut ClientConfig),
{
    let mut config = load_config_from(dir)?;
    updater(&mut config);
    save_config_to(dir, &config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut ClientConfig) {
    if let Ok(url) = std::env::var("ERRORX_SERVICE_URL") {
        if !url.trim().is_empty() {
            tracing::debug!("Service URL overridden from environment: {}", url);
            config.service_url = url.trim().to_string();
        }
    }
}

fn validate(config: &ClientConfig) -> CoreResult<()> {
    config.validate().map_err(|e| CoreError::Config(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config_from(dir.path()).unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let updated = update_config_in(dir.path(), |c| c.proxy_poll_secs = 10).unwrap();
        assert_eq!(updated.proxy_poll_secs, 10);

        let loaded = load_config_from(dir.path()).unwrap();
        assert_eq!(loaded.proxy_poll_secs, 10);
        assert!(!dir.path().join("client_config.json.tmp").exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), r#"{ "refresh_throttle_ms": 500 }"#).unwrap();
        let config = load_config_from(dir.path()).unwrap();
        assert_eq!(config.refresh_throttle_ms, 500);
        assert_eq!(config.service_url, "http://127.0.0.1:33211");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), r#"{ "api_timeout_secs": 0 }"#).unwrap();
        assert!(matches!(load_config_from(dir.path()), Err(CoreError::Config(_))));

        fs::write(dir.path().join(CONFIG_FILE), "not json").unwrap();
        assert!(matches!(load_config_from(dir.path()), Err(CoreError::Json(_))));
    }
}
