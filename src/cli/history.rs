//! History command implementation

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use super::utils::resolve_config;
use crate::config::CliOverrides;
use crate::exposure::ExposureStore;

#[derive(Args)]
pub struct HistoryArgs {
    /// Caller (chatbot) identity
    #[arg(long, value_name = "ID")]
    pub caller: String,

    /// SQLite exposure database
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Print events as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: HistoryArgs, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(
        config_path,
        CliOverrides { db_path: args.db.clone(), ..CliOverrides::default() },
    )?;

    let store = ExposureStore::open(&config.db_path)?;
    let events = store.history(&args.caller)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("No deliveries recorded for caller {}", args.caller);
        return Ok(());
    }

    println!("Deliveries for caller {}:", args.caller);
    for event in events {
        let ad = event.ad_id.as_ref().map(|id| id.as_str()).unwrap_or("-");
        println!(
            "- {} ad={} query={:?} ({})",
            event.received_at.to_rfc3339(),
            ad,
            event.query,
            event.detail.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
