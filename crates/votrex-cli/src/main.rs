//! VotreX CLI - operator interface
//!
//! Resolves wallet roles, checks access, and relinks the token contract
//! against either the in-memory ledger or a ledger relay.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use votrex_types::{ConfigTargetKind, OrgId};

mod commands;
mod config;

use commands::{Context, Requirement};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "votrex")]
#[command(about = "VotreX - wallet roles, access checks and contract linkage", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "VOTREX_CONFIG")]
    config: Option<String>,

    /// System admin address, overrides the configured one
    #[arg(long, env = "VOTREX_SYSTEM_ADMIN_ADDRESS")]
    system_admin: Option<String>,

    /// Log level
    #[arg(long, env = "VOTREX_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "VOTREX_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print where the wallet lands
    Login {
        #[arg(long)]
        org: OrgId,

        /// Connected wallet; omitted means no wallet
        #[arg(long, env = "VOTREX_ADDRESS")]
        address: Option<String>,
    },

    /// Check a wallet against a role requirement
    Check {
        #[arg(long)]
        org: OrgId,

        #[arg(long, env = "VOTREX_ADDRESS")]
        address: Option<String>,

        #[arg(long, value_enum)]
        require: Requirement,
    },

    /// Point the token contract at a system, staking or DEX contract
    Link {
        /// system, staking or dex
        kind: ConfigTargetKind,

        /// New contract address
        destination: String,

        #[arg(long, env = "VOTREX_ADDRESS")]
        address: Option<String>,

        /// Organization used to look up non-admin callers
        #[arg(long, default_value = "system")]
        org: OrgId,
    },

    /// Show the member count of an organization
    Members {
        #[arg(long)]
        org: OrgId,

        #[arg(long, env = "VOTREX_ADDRESS")]
        address: Option<String>,
    },
}

impl Commands {
    fn address(&self) -> Option<&str> {
        match self {
            Commands::Login { address, .. }
            | Commands::Check { address, .. }
            | Commands::Link { address, .. }
            | Commands::Members { address, .. } => address.as_deref(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(admin) = cli.system_admin.clone() {
        config.system_admin_address = Some(admin);
    }

    // Initialize tracing
    let level = cli.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if cli.json || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().without_time())
            .init();
    }

    let identity = commands::parse_identity(cli.command.address())?;
    let ctx = Context::new(&config, identity.as_ref())?;

    match cli.command {
        Commands::Login { org, .. } => commands::login(&ctx, &org, identity).await,
        Commands::Check { org, require, .. } => {
            commands::check(&ctx, org, identity, require).await
        }
        Commands::Link {
            kind,
            destination,
            org,
            ..
        } => commands::link(&ctx, org, identity, kind, &destination).await,
        Commands::Members { org, .. } => commands::members(&ctx, org, identity).await,
    }
}
