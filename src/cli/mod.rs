//! Command-line interface for adrank
//!
//! Provides `rank`, `recommend`, `prerank` and `history` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod history;
mod prerank;
mod rank;
mod recommend;
mod utils;

/// Rank ads by keyword relevance and keep callers from seeing the same ad twice
#[derive(Parser)]
#[command(name = "adrank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (adrank.toml or .adrank.yml)
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank a catalog against one or more queries
    Rank(rank::RankArgs),

    /// Deliver the most relevant unseen ad to a caller and record it as shown
    Recommend(recommend::RecommendArgs),

    /// Pre-rank a catalog for a set of interest queries
    Prerank(prerank::PrerankArgs),

    /// Show a caller's delivery history
    History(history::HistoryArgs),
}

/// `--verbose` forces DEBUG on top of `RUST_LOG`; otherwise `RUST_LOG` is used as given,
/// and WARN applies when it is unset or empty.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let rust_log = rust_log.map(str::trim).filter(|directives| !directives.is_empty());
    match (verbose, rust_log) {
        (true, directives) => {
            EnvFilter::new(directives.unwrap_or_default()).add_directive(Level::DEBUG.into())
        }
        (false, Some(directives)) => EnvFilter::new(directives),
        (false, None) => EnvFilter::new("warn"),
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = log_filter(cli.verbose, rust_log.as_deref());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Rank(args) => rank::run(args, config_path),
        Commands::Recommend(args) => recommend::run(args, config_path),
        Commands::Prerank(args) => prerank::run(args, config_path),
        Commands::History(args) => history::run(args, config_path),
    }
}
