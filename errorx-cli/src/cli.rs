use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "errorx",
    about = "ErrorX Client - Headless license and profile control",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, env = "ERRORX_LICENSE_KEY", hide_env_values = true)]
    pub key: Option<String>,

    #[arg(long, global = true, env = "ERRORX_SERVICE_URL", help = "Override the service URL")]
    pub service_url: Option<String>,

    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        visible_alias = "login",
        about = "Validate the license key and hold the session until expiry or Ctrl-C"
    )]
    Run,

    #[command(about = "Show license details")]
    License {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(subcommand, about = "Control the local proxy servers")]
    Proxy(ProxyCommands),

    #[command(subcommand, about = "Manage routing profiles")]
    Profiles(ProfileCommands),

    #[command(subcommand, about = "View and modify client configuration")]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ProxyCommands {
    #[command(about = "Show server pool and port status")]
    Status {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Start all proxy servers")]
    Start,

    #[command(about = "Stop all proxy servers")]
    Stop,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    #[command(about = "List profiles")]
    List {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Make a profile current")]
    Select {
        #[arg(help = "Profile uid")]
        uid: String,

        #[arg(long, help = "Re-apply even if already current")]
        force: bool,
    },

    #[command(about = "Re-derive routing state from all profiles")]
    Enhance,

    #[command(about = "Delete a profile")]
    Delete {
        #[arg(help = "Profile uid")]
        uid: String,
    },

    #[command(about = "Move a profile to the position of another")]
    Reorder {
        #[arg(help = "Uid of the profile to move")]
        active: String,

        #[arg(help = "Uid of the profile whose position it takes")]
        over: String,
    },

    #[command(about = "Import a remote profile from a subscription URL")]
    Import {
        #[arg(help = "Subscription URL")]
        url: String,
    },

    #[command(about = "Create the built-in ErrorX profile")]
    CreateDefault,

    #[command(about = "Create local profiles from YAML files")]
    ImportFile {
        #[arg(required = true, help = "YAML files to import")]
        paths: Vec<PathBuf>,
    },

    #[command(about = "Refresh one remote profile")]
    Update {
        #[arg(help = "Profile uid")]
        uid: String,
    },

    #[command(about = "Refresh every remote profile")]
    UpdateAll,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show current configuration")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Set a configuration value")]
    Set {
        #[arg(help = "Configuration key (e.g., 'service_url', 'proxy_poll_secs')")]
        key: String,

        #[arg(help = "New value")]
        value: String,
    },
}
