//! Recommend command implementation

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use super::utils::resolve_config;
use crate::catalog::load_catalog;
use crate::config::CliOverrides;
use crate::delivery::{deliver, DeliveryRequest};
use crate::exposure::ExposureStore;

#[derive(Args)]
pub struct RecommendArgs {
    /// Ad catalog file (JSON array, or JSON Lines with .jsonl)
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Caller (chatbot) identity the exposure history is kept for
    #[arg(long, value_name = "ID")]
    pub caller: String,

    /// Query text
    #[arg(short = 'q', long, value_name = "TEXT")]
    pub query: String,

    /// Caller-specific tracking token substituted into the destination URL
    #[arg(long, value_name = "TOKEN")]
    pub tracking_id: String,

    /// SQLite exposure database
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Only the most recent K deliveries count as exposure
    #[arg(long, value_name = "K")]
    pub exposure_window: Option<usize>,

    /// Placeholder in URL templates replaced by the tracking token
    #[arg(long, value_name = "TEXT")]
    pub placeholder: Option<String>,

    /// Weight of a title match
    #[arg(long, value_name = "WEIGHT")]
    pub title_weight: Option<u32>,

    /// Weight of a body match
    #[arg(long, value_name = "WEIGHT")]
    pub body_weight: Option<u32>,

    /// Print the delivered ad as JSON instead of its URL
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RecommendArgs, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(
        config_path,
        CliOverrides {
            title_weight: args.title_weight,
            body_weight: args.body_weight,
            exposure_window: args.exposure_window,
            tracking_placeholder: args.placeholder.clone(),
            db_path: args.db.clone(),
            ..CliOverrides::default()
        },
    )?;

    let catalog = load_catalog(&args.catalog)?;
    let mut store = ExposureStore::open(&config.db_path)?.with_window(config.exposure_window.into());

    let request = DeliveryRequest {
        caller_id: &args.caller,
        query: &args.query,
        tracking_id: &args.tracking_id,
    };

    match deliver(&mut store, &catalog, &request, &config)? {
        Some(delivery) if args.json => {
            println!("{}", serde_json::to_string_pretty(&delivery.view)?);
        }
        Some(delivery) => println!("{}", delivery.view.url),
        None => println!("No unseen ads left for caller {}", args.caller),
    }

    Ok(())
}
