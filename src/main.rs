use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use portalscan_cli::cli::{
    cmd_check, cmd_queue, cmd_results, cmd_session, CheckArgs, QueueArgs, ResultsArgs, SessionArgs,
};
use portalscan_cli::config::ScanConfig;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(
    name = "portalscan",
    version,
    long_version = LONG_VERSION,
    about = "Queue-driven records retrieval from an API-less web portal"
)]
struct Cli {
    /// Config file overriding the built-in defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect or clear the persisted scan session
    Session(SessionArgs),
    /// Dump captured records
    Results(ResultsArgs),
    /// Dry-run the queue builder against saved schedule markup
    Queue(QueueArgs),
    /// Classify a saved page snapshot
    Check(CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = ScanConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Session(args) => cmd_session(&config, args),
        Command::Results(args) => cmd_results(&config, args),
        Command::Queue(args) => cmd_queue(args),
        Command::Check(args) => cmd_check(args),
    }
}
