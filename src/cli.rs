use clap::{Parser, Subcommand};
use lastseen::config::HumanDuration;
use lastseen::ledger::Timestamp;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lastseen")]
#[command(about = "Activity ledger and inactivity reports", long_about = None)]
pub struct Cli {
    /// Configuration file (overrides LASTSEEN_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record one activity event
    Record(RecordArgs),
    /// Show when a subject was last seen
    LastSeen(LastSeenArgs),
    /// Show the most recent events, oldest first
    Recent(RecentArgs),
    /// Classify a roster by inactivity
    Inactive(InactiveArgs),
    /// Replace the ledger with a legacy activity document
    Import(ImportArgs),
    /// Run the HTTP server
    Server(ServerArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(clap::Args, Debug)]
pub struct RecordArgs {
    #[arg(long)]
    pub subject: String,

    /// message, reaction, voice or any other label
    #[arg(long, default_value = "other")]
    pub kind: String,

    /// RFC 3339 timestamp, defaults to now
    #[arg(long)]
    pub at: Option<Timestamp>,
}

#[derive(clap::Args, Debug)]
pub struct LastSeenArgs {
    #[arg(long)]
    pub subject: String,
}

#[derive(clap::Args, Debug)]
pub struct RecentArgs {
    /// Defaults to query.recent_limit
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct InactiveArgs {
    /// JSON array of { "subject_id", "display_name" }
    #[arg(long)]
    pub roster: PathBuf,

    /// e.g. 30d, 2w; defaults to query.inactivity_threshold
    #[arg(long)]
    pub threshold: Option<HumanDuration>,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Include active subjects
    #[arg(long)]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Path to the legacy activity.json
    #[arg(long)]
    pub legacy: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to, defaults to server.bind_addr
    #[arg(long)]
    pub address: Option<SocketAddr>,
}
