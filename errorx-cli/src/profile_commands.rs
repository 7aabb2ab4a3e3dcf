use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use std::path::PathBuf;

use errorx_core::{ClientContext, Outcome};

pub fn list(ctx: &ClientContext, json: bool) -> Result<()> {
    let set = ctx.profiles().profiles();

    if json {
        println!("{}", serde_json::to_string_pretty(&set)?);
        return Ok(());
    }

    let items: Vec<_> = set.user_items().collect();
    if items.is_empty() {
        println!("{}", "No profiles found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["UID", "Name", "Type", "Source", "Current"]);

    for profile in &items {
        let current = if set.is_current(&profile.uid) {
            Cell::new("●").fg(Color::Green)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(&profile.uid),
            Cell::new(&profile.name),
            Cell::new(format!("{:?}", profile.kind).to_lowercase()),
            Cell::new(profile.url.as_deref().unwrap_or("-")),
            current,
        ]);
    }

    println!("{table}");
    println!("\n{} profiles total", items.len());
    Ok(())
}

pub async fn import_files(ctx: &ClientContext, paths: &[PathBuf]) -> Result<()> {
    let outcomes = ctx.profiles().import_files(paths).await;
    let created = outcomes.iter().filter(|o| o.is_applied()).count();
    println!("{} Created {} of {} profiles", "✓".green(), created, paths.len());

    for (path, outcome) in paths.iter().zip(&outcomes) {
        if let Outcome::Rejected(message) | Outcome::Failed(message) = outcome {
            println!("  {} {}: {}", "✗".red(), path.display(), message);
        }
    }
    if created == 0 {
        anyhow::bail!("No profiles were created");
    }
    Ok(())
}

pub async fn update_all(ctx: &ClientContext) -> Result<()> {
    let report = ctx.profiles().update_all().await;
    if report.rejected {
        println!("{} Skipped: a batch update is already running", "-".yellow());
        return Ok(());
    }

    println!(
        "{} Updated {} of {} remote profiles",
        "✓".green(),
        report.succeeded.len(),
        report.dispatched.len()
    );
    for uid in &report.skipped_busy {
        println!("  {} {}: already updating", "-".yellow(), uid);
    }
    for (uid, message) in &report.failed {
        println!("  {} {}: {}", "✗".red(), uid, message);
    }
    Ok(())
}
