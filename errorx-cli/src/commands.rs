use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use tokio::sync::broadcast;

use errorx_core::modules::events::drain;
use errorx_core::{ClientContext, ClientEvent, Outcome, SkipReason};
use errorx_types::{Notice, NoticeLevel};

use crate::cli::{Commands, ConfigCommands, ProfileCommands, ProxyCommands};
use crate::{config_commands, profile_commands, proxy_commands, session_commands};

pub async fn dispatch(ctx: &ClientContext, key: &str, command: Commands) -> Result<()> {
    match command {
        Commands::Run => session_commands::run(ctx, key).await,
        Commands::License { json } => session_commands::show_license(ctx, key, json).await,
        Commands::Proxy(cmd) => handle_proxy_command(ctx, key, cmd).await,
        Commands::Profiles(cmd) => handle_profile_command(ctx, key, cmd).await,
        Commands::Config(_) => anyhow::bail!("config commands do not need a session"),
    }
}

pub async fn handle_proxy_command(ctx: &ClientContext, key: &str, cmd: ProxyCommands) -> Result<()> {
    authenticate(ctx, key).await?;
    match cmd {
        ProxyCommands::Status { json } => proxy_commands::show_status(ctx, json).await,
        ProxyCommands::Start => proxy_commands::start(ctx).await,
        ProxyCommands::Stop => proxy_commands::stop(ctx).await,
    }
}

pub async fn handle_profile_command(ctx: &ClientContext, key: &str, cmd: ProfileCommands) -> Result<()> {
    authenticate(ctx, key).await?;
    ctx.profiles().refresh().await?;

    let mut rx = ctx.events().subscribe();
    let result = match cmd {
        ProfileCommands::List { json } => profile_commands::list(ctx, json),
        ProfileCommands::Select { uid, force } => {
            report(&ctx.profiles().select(&uid, force).await, &format!("Selected {uid}"))
        },
        ProfileCommands::Enhance => report(&ctx.profiles().enhance(true).await, "Profiles reactivated"),
        ProfileCommands::Delete { uid } => report(&ctx.profiles().delete(&uid).await, &format!("Deleted {uid}")),
        ProfileCommands::Reorder { active, over } => report(
            &ctx.profiles().reorder(&active, &over).await,
            &format!("Moved {active} to the position of {over}"),
        ),
        ProfileCommands::Import { url } => {
            report(&ctx.profiles().import(&url).await, "Subscription imported")
        },
        ProfileCommands::CreateDefault => {
            report(&ctx.profiles().create_default().await, "Default profile created")
        },
        ProfileCommands::ImportFile { paths } => profile_commands::import_files(ctx, &paths).await,
        ProfileCommands::Update { uid } => {
            report(&ctx.profiles().update_one(&uid).await, &format!("Updated {uid}"))
        },
        ProfileCommands::UpdateAll => profile_commands::update_all(ctx).await,
    };
    print_notices(&mut rx);
    result
}

pub fn handle_config_command(data_dir: &Path, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show { json } => config_commands::show_config(data_dir, json),
        ConfigCommands::Set { key, value } => config_commands::set_config_value(data_dir, &key, &value),
    }
}

/// Validate `key` and open an in-process session. Session-bound commands
/// refuse to run without one.
pub async fn authenticate(ctx: &ClientContext, key: &str) -> Result<()> {
    if key.trim().is_empty() {
        anyhow::bail!("Specify --key or set ERRORX_LICENSE_KEY");
    }
    ctx.sign_in(key).await?;
    ctx.session().require_auth()?;
    Ok(())
}

/// Print every notice queued on `rx`.
pub fn print_notices(rx: &mut broadcast::Receiver<ClientEvent>) {
    for event in drain(rx) {
        if let ClientEvent::Notice(notice) = event {
            print_notice(&notice);
        }
    }
}

pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success => println!("{} {}", "✓".green(), notice.message.green()),
        NoticeLevel::Info => println!("{} {}", "i".cyan(), notice.message.cyan()),
        NoticeLevel::Error => println!("{} {}", "✗".red(), notice.message.red()),
    }
}

/// Turn an operation outcome into an exit status. Failures were already
/// printed as notices.
fn report(outcome: &Outcome, done: &str) -> Result<()> {
    match outcome {
        Outcome::Applied => {
            println!("{} {}", "✓".green(), done);
            Ok(())
        },
        Outcome::Skipped(reason) => {
            let why = match reason {
                SkipReason::Unchanged => "nothing to change",
                SkipReason::InFlight => "another operation of this kind is running",
                SkipReason::Busy => "profile is already updating",
            };
            println!("{} Skipped: {}", "-".yellow(), why);
            Ok(())
        },
        Outcome::Rejected(message) | Outcome::Failed(message) => anyhow::bail!("{}", message),
    }
}
