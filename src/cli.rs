use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Role-aware task tracker with an approval workflow.
/// Board state defaults to ~/.bugtrack/board.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "bt", version, about = "Task and bug tracking CLI")]
pub struct Cli {
    /// Path to the JSON board file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
