//! CLI override merging

use crate::domain::Config;
use std::path::PathBuf;

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub title_weight: Option<u32>,
    pub body_weight: Option<u32>,
    pub top_n: Option<usize>,
    pub prerank_size: Option<usize>,
    pub per_query_limit: Option<usize>,
    pub exposure_window: Option<usize>,
    pub tracking_placeholder: Option<String>,
    pub db_path: Option<PathBuf>,
}

pub fn merge_cli_with_config(mut config: Config, cli: CliOverrides) -> Config {
    if let Some(v) = cli.title_weight {
        config.title_weight = v;
    }
    if let Some(v) = cli.body_weight {
        config.body_weight = v;
    }
    if let Some(v) = cli.top_n {
        config.top_n = v;
    }
    if let Some(v) = cli.prerank_size {
        config.prerank_size = v;
    }
    if let Some(v) = cli.per_query_limit {
        config.per_query_limit = v;
    }
    if let Some(v) = cli.exposure_window {
        config.exposure_window = Some(v);
    }
    if let Some(v) = cli.tracking_placeholder {
        config.tracking_placeholder = v;
    }
    if let Some(v) = cli.db_path {
        config.db_path = v;
    }
    config
}
