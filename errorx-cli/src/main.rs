//! ErrorX CLI - Headless driver
//!
//! Drives the orchestration core against a running ErrorX service:
//! - `run` / `login` holds a session and enforces license expiry
//! - `license`, `proxy`, `profiles` perform one-shot operations
//! - `config` edits `client_config.json`
//!
//! Every session-bound command validates `--key` (or `ERRORX_LICENSE_KEY`)
//! first; nothing is persisted between invocations.

#![allow(clippy::print_stdout, reason = "CLI tool outputs to stdout")]

use anyhow::Result;
use clap::Parser;

use errorx_core::modules::{config, logger};
use errorx_core::ClientContext;

mod cli;
mod commands;
mod config_commands;
mod profile_commands;
mod proxy_commands;
mod session_commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = config::get_data_dir()?;
    let _log_guard =
        logger::init_logger(Some(&data_dir.join("logs")), &cli.log_level).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Config(cmd) => commands::handle_config_command(&data_dir, cmd),
        command => {
            let mut client_config = config::load_config()?;
            if let Some(url) = cli.service_url {
                client_config.service_url = url;
            }
            let ctx = ClientContext::connect(client_config)?;
            let key = cli.key.unwrap_or_default();
            commands::dispatch(&ctx, &key, command).await
        },
    }
}
