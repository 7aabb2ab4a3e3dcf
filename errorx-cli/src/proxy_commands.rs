use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};

use errorx_core::modules::proxy_panel::ProxySnapshot;
use errorx_core::ClientContext;

pub async fn show_status(ctx: &ClientContext, json: bool) -> Result<()> {
    let snapshot = ctx.proxy().refresh().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }
    print_snapshot(&snapshot);
    Ok(())
}

pub async fn start(ctx: &ClientContext) -> Result<()> {
    println!("{}", "Starting proxy servers...".cyan());
    let snapshot = ctx.proxy().start().await?;
    println!("{} {} of {} ports running", "✓".green(), snapshot.running_ports(), snapshot.ports.len());
    Ok(())
}

pub async fn stop(ctx: &ClientContext) -> Result<()> {
    println!("{}", "Stopping proxy servers...".cyan());
    let snapshot = ctx.proxy().stop().await?;
    if snapshot.is_running() {
        println!("{} {} ports still running", "!".yellow(), snapshot.running_ports());
    } else {
        println!("{} Proxy servers stopped", "✓".green());
    }
    Ok(())
}

fn print_snapshot(snapshot: &ProxySnapshot) {
    let servers = &snapshot.servers;
    println!(
        "Servers: {} total, {} live, {} reserved",
        servers.total_servers, servers.live_servers, servers.reserved_servers
    );

    if snapshot.ports.is_empty() {
        println!("{}", "No proxy ports reported.".yellow());
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Port", "Status"]);
    for port in &snapshot.ports {
        let status = if port.is_running() {
            Cell::new("Running").fg(Color::Green)
        } else {
            Cell::new("Stopped").fg(Color::Red)
        };
        table.add_row(vec![Cell::new(port.0), status]);
    }
    println!("{table}");
    println!("\n{} of {} ports running", snapshot.running_ports(), snapshot.ports.len());
}
