//! Prerank command implementation

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use super::utils::resolve_config;
use crate::catalog::{load_catalog, prerank, PrerankOptions};
use crate::config::CliOverrides;
use crate::domain::AdId;
use crate::exposure::ExposureStore;

#[derive(Args)]
pub struct PrerankArgs {
    /// Ad catalog file (JSON array, or JSON Lines with .jsonl)
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Interest query; repeat for each interest
    #[arg(short = 'q', long = "query", value_name = "TEXT", required = true)]
    pub queries: Vec<String>,

    /// Number of ads to keep
    #[arg(long, value_name = "COUNT")]
    pub size: Option<usize>,

    /// Candidates gathered per query before ranking
    #[arg(long, value_name = "COUNT")]
    pub per_query_limit: Option<usize>,

    /// Store the result as this caller's candidate pool for `recommend`
    #[arg(long, value_name = "ID")]
    pub caller: Option<String>,

    /// SQLite exposure database (used with --caller)
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Weight of a title match
    #[arg(long, value_name = "WEIGHT")]
    pub title_weight: Option<u32>,

    /// Weight of a body match
    #[arg(long, value_name = "WEIGHT")]
    pub body_weight: Option<u32>,
}

pub fn run(args: PrerankArgs, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(
        config_path,
        CliOverrides {
            title_weight: args.title_weight,
            body_weight: args.body_weight,
            prerank_size: args.size,
            per_query_limit: args.per_query_limit,
            db_path: args.db.clone(),
            ..CliOverrides::default()
        },
    )?;

    let catalog = load_catalog(&args.catalog)?;
    let ranked = prerank(&catalog, &args.queries, PrerankOptions::from(&config));
    tracing::info!(ranked = ranked.len(), catalog = catalog.len(), "pre-ranked catalog");

    let ids: Vec<AdId> = ranked.iter().map(|ad| ad.id.clone()).collect();
    if let Some(caller) = args.caller.as_deref() {
        let mut store = ExposureStore::open(&config.db_path)?;
        store.save_candidates(caller, &ids)?;
    }
    println!("{}", serde_json::to_string_pretty(&ids)?);
    Ok(())
}
