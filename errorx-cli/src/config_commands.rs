use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use errorx_core::modules::config as core_config;

pub fn show_config(data_dir: &Path, json: bool) -> Result<()> {
    let config = core_config::load_config_from(data_dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("{}", "Client Configuration:".cyan().bold());
        println!("  Service URL: {}", config.service_url);
        println!("  API timeout: {}s", config.api_timeout_secs);
        println!("  License tick: {}ms", config.license_tick_ms);
        println!("  Activation debounce: {}ms", config.activation_debounce_ms);
        println!("  Refresh throttle: {}ms", config.refresh_throttle_ms);
        println!("  Proxy poll: {}s", config.proxy_poll_secs);
    }
    Ok(())
}

pub fn set_config_value(data_dir: &Path, key: &str, value: &str) -> Result<()> {
    let number = || {
        value.parse::<u64>().map_err(|_| anyhow::anyhow!("Invalid number: {}", value))
    };

    let apply: Box<dyn FnOnce(&mut errorx_types::ClientConfig)> = match key {
        "service_url" => {
            let url = value.trim().to_string();
            Box::new(move |c| c.service_url = url)
        },
        "api_timeout_secs" => {
            let n = number()?;
            Box::new(move |c| c.api_timeout_secs = n)
        },
        "license_tick_ms" => {
            let n = number()?;
            Box::new(move |c| c.license_tick_ms = n)
        },
        "activation_debounce_ms" => {
            let n = number()?;
            Box::new(move |c| c.activation_debounce_ms = n)
        },
        "refresh_throttle_ms" => {
            let n = number()?;
            Box::new(move |c| c.refresh_throttle_ms = n)
        },
        "proxy_poll_secs" => {
            let n = number()?;
            Box::new(move |c| c.proxy_poll_secs = n)
        },
        _ => anyhow::bail!("Unknown config key: {}", key),
    };

    core_config::update_config_in(data_dir, apply)?;
    println!("{} Config updated: {} = {}", "✓".green(), key, value);
    Ok(())
}
