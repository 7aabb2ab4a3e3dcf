use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use errorx_core::modules::license::format_remaining;
use errorx_core::{ClientContext, ClientEvent, LicenseSummary};

use crate::commands::{authenticate, print_notice};

const STATUS_INTERVAL: Duration = Duration::from_secs(60);

pub async fn show_license(ctx: &ClientContext, key: &str, json: bool) -> Result<()> {
    authenticate(ctx, key).await?;
    let record = ctx.monitor().load().await?;
    let summary = LicenseSummary::build(&record, Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Hold a session until the license expires or the process is interrupted.
pub async fn run(ctx: &ClientContext, key: &str) -> Result<()> {
    let mut rx = ctx.events().subscribe();
    authenticate(ctx, key).await?;

    let handles = ctx.open_home().await?;
    print_summary(&LicenseSummary::build(&handles.record, Utc::now()));
    println!("{}", "Session active. Press Ctrl-C to sign out.".cyan());

    let signal = shutdown_signal();
    tokio::pin!(signal);
    let mut status = tokio::time::interval(STATUS_INTERVAL);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(ClientEvent::Notice(notice)) => print_notice(&notice),
                Ok(ClientEvent::RedirectToLogin) => {
                    println!("{}", "Session ended.".yellow());
                    break;
                },
                Ok(_) => {},
                Err(RecvError::Lagged(skipped)) => warn!("Missed {} client events", skipped),
                Err(RecvError::Closed) => break,
            },
            _ = status.tick() => {
                if let Some(record) = ctx.monitor().record() {
                    info!("License remaining: {}", format_remaining(&record, Utc::now()));
                }
            }
            () = &mut signal => {
                ctx.sign_out().await;
                break;
            }
        }
    }

    ctx.monitor().stop();
    ctx.proxy().stop_polling();
    if let Some(monitor) = handles.monitor {
        let _ = monitor.await;
    }
    let _ = handles.proxy_poll.await;
    info!("Monitor state: {}", ctx.monitor().state());
    Ok(())
}

fn print_summary(summary: &LicenseSummary) {
    let device = if summary.device_active { "active".green() } else { "inactive".red() };
    println!("{}", "License:".cyan().bold());
    println!("  Key: {}", summary.masked_key);
    println!("  Plan: {}", summary.plan);
    println!("  Platform: {}", summary.platform);
    println!("  Device: {}", device);
    println!("  Remaining: {}", summary.remaining);
    println!("  Expires: {}", summary.expires);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, signing out..."),
        () = terminate => info!("Received SIGTERM, signing out..."),
    }
}
