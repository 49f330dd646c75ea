//! bt - task and bug tracking CLI.
//!
//! A demo tracker for a two-person team: developers pick up and complete
//! work, managers approve or send it back. State lives in a local JSON
//! board file; everything else is in memory.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bugtrack::cli::Cli;
use bugtrack::cmd::{self, Commands};
use bugtrack::store::Board;

fn main() {
    // Tracing is opt-in via RUST_LOG.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let cli = Cli::parse();

    // Completions don't need board state.
    if let Commands::Completions { shell } = &cli.command {
        cmd::cmd_completions(*shell);
        return;
    }

    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let dir = PathBuf::from(home).join(".bugtrack");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("Failed to create data directory {}: {e}", dir.display());
            std::process::exit(1);
        }
        dir.join("board.json")
    });

    let mut board = Board::load(&db_path);

    match cli.command {
        Commands::Completions { .. } => unreachable!("handled above"),

        Commands::Login { email, password } => {
            cmd::cmd_login(&mut board, &db_path, &email, &password)
        }
        Commands::Logout => cmd::cmd_logout(&mut board, &db_path),
        Commands::Whoami => cmd::cmd_whoami(&board),

        Commands::Add { title, desc, kind, priority, assignee, due } => {
            cmd::cmd_add(&mut board, &db_path, title, desc, kind, priority, assignee, due)
        }

        Commands::List { search, status, priority, kind, assignee } => {
            cmd::cmd_list(&board, search, status, priority, kind, assignee)
        }

        Commands::View { id } => cmd::cmd_view(&board, &id),

        Commands::Update { id, title, desc, kind, priority, assignee, due, clear_due } => {
            cmd::cmd_update(
                &mut board, &db_path, &id, title, desc, kind, priority, assignee, due, clear_due,
            )
        }

        Commands::Delete { id } => cmd::cmd_delete(&mut board, &db_path, &id),

        Commands::Start { id } => {
            cmd::cmd_transition(&mut board, &db_path, &id, bugtrack::fields::Status::InProgress)
        }
        Commands::Complete { id } => cmd::cmd_transition(
            &mut board,
            &db_path,
            &id,
            bugtrack::fields::Status::PendingApproval,
        ),
        Commands::Approve { id } => {
            cmd::cmd_transition(&mut board, &db_path, &id, bugtrack::fields::Status::Closed)
        }
        Commands::Reopen { id } => {
            cmd::cmd_transition(&mut board, &db_path, &id, bugtrack::fields::Status::Reopened)
        }

        Commands::Log { id, hours, desc, date } => {
            cmd::cmd_log(&mut board, &db_path, &id, hours, desc, date)
        }

        Commands::Trend { days } => cmd::cmd_trend(&board, days),
        Commands::Stats => cmd::cmd_stats(&board),
        Commands::Assignees => cmd::cmd_assignees(&board),

        Commands::Seed => cmd::cmd_seed(&mut board, &db_path),
    }
}
