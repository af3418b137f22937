//! Rank command implementation

use anyhow::Result;
use clap::Args;
use serde_json::json;
use std::path::{Path, PathBuf};

use super::utils::{parse_csv, resolve_config};
use crate::catalog::{load_catalog, resolve_pool};
use crate::config::CliOverrides;
use crate::domain::{Ad, AdId};
use crate::exposure::{filter_unseen, ExposureSet, ExposureStore};
use crate::rank::AdRanker;

#[derive(Args)]
pub struct RankArgs {
    /// Ad catalog file (JSON array, or JSON Lines with .jsonl)
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Query text; repeat to rank by the cumulative score over several queries
    #[arg(short = 'q', long = "query", value_name = "TEXT", required = true)]
    pub queries: Vec<String>,

    /// Max results to display
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Ad ids to exclude (comma-separated)
    #[arg(long, value_name = "IDS")]
    pub exclude: Option<String>,

    /// Rank within this caller's pre-ranked ads and skip those already shown to it
    #[arg(long, value_name = "ID")]
    pub caller: Option<String>,

    /// SQLite exposure database (used with --caller)
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Only the most recent K deliveries count as exposure
    #[arg(long, value_name = "K")]
    pub exposure_window: Option<usize>,

    /// Weight of a title match
    #[arg(long, value_name = "WEIGHT")]
    pub title_weight: Option<u32>,

    /// Weight of a body match
    #[arg(long, value_name = "WEIGHT")]
    pub body_weight: Option<u32>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RankArgs, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(
        config_path,
        CliOverrides {
            title_weight: args.title_weight,
            body_weight: args.body_weight,
            top_n: args.limit,
            exposure_window: args.exposure_window,
            db_path: args.db.clone(),
            ..CliOverrides::default()
        },
    )?;

    let catalog = load_catalog(&args.catalog)?;

    let mut pool: Vec<&Ad> = catalog.iter().collect();
    let mut shown: ExposureSet = parse_csv(&args.exclude)
        .unwrap_or_default()
        .into_iter()
        .map(AdId::from)
        .collect();
    if let Some(caller) = args.caller.as_deref() {
        let store = ExposureStore::open(&config.db_path)?.with_window(config.exposure_window.into());
        shown.extend(store.shown_ads(caller)?.iter().cloned());
        if let Some(ranked_ids) = store.candidates(caller)? {
            pool = resolve_pool(&catalog, &ranked_ids);
        }
    }

    let unseen = filter_unseen(pool, &shown);
    let ranked = AdRanker::with_weights(config.weights()).rank_scored(
        unseen,
        &args.queries,
        config.top_n,
    );

    if args.json {
        let out: Vec<_> = ranked
            .iter()
            .map(|c| json!({ "id": c.ad.id, "title": c.ad.title, "score": c.score }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if ranked.is_empty() {
        println!("No unseen ads left.");
        return Ok(());
    }

    println!("Top ads for: {}", args.queries.join(" | "));
    for (idx, candidate) in ranked.iter().enumerate() {
        println!(
            "{}. [{}] {} (score {})",
            idx + 1,
            candidate.ad.id,
            candidate.ad.title,
            candidate.score
        );
    }

    Ok(())
}
