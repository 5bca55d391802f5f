//! Attesta CLI: organizations, members, credits and credentials.
//!
//! Subcommands: init, org, member, lookup, ledger, credential.

mod commands;
mod config;
mod storage;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::Context;
use config::AttestaConfig;

/// Attesta: tamper-evident credentials and metered identities.
#[derive(Parser, Debug)]
#[command(name = "attesta", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "attesta.toml")]
    config: PathBuf,

    /// Override the data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Password used to seal and open seed phrases. Without it the
    /// configured legacy app key is used.
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Register, list and remove organizations.
    Org(commands::org::OrgArgs),
    /// Add and remove organization members.
    Member(commands::member::MemberArgs),
    /// Find the organization or member a seed phrase belongs to.
    Lookup(commands::lookup::LookupArgs),
    /// Bootstrap, move and inspect credits.
    Ledger(commands::ledger::LedgerArgs),
    /// Issue and verify credentials.
    Credential(commands::credential::CredentialArgs),
}

fn init_tracing(config: &AttestaConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.json_logs() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AttestaConfig::load(&cli.config)?;
    if let Some(ref data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    if let Commands::Init(args) = &cli.command {
        return commands::init::run(args, &cli.config);
    }

    let ctx = Context::open(config, cli.password)?;
    match &cli.command {
        Commands::Init(_) => Ok(()),
        Commands::Org(args) => commands::org::run(args, &ctx).await,
        Commands::Member(args) => commands::member::run(args, &ctx).await,
        Commands::Lookup(args) => commands::lookup::run(args, &ctx).await,
        Commands::Ledger(args) => commands::ledger::run(args, &ctx).await,
        Commands::Credential(args) => commands::credential::run(args, &ctx).await,
    }
}
