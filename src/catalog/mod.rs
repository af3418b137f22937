//! Ad catalog loading and validation.
//!
//! Raw records are validated once here and turned into [`Ad`] values; the engine never
//! re-validates them. Records may use either the native field names or the document
//! store names (`_id`, `product_title`, `full_content`, `generic_product_URL`,
//! `description_for_chatbot`, `last_time_accessed`).

use crate::domain::{Ad, AdId};
use crate::error::CatalogError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub mod candidates;

pub use candidates::{gather_candidates, prerank, resolve_pool, PrerankOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    /// A single JSON array of records.
    Json,
    /// One JSON record per line.
    JsonLines,
}

impl CatalogFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
        match ext.as_str() {
            "jsonl" | "ndjson" => CatalogFormat::JsonLines,
            _ => CatalogFormat::Json,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AdRecord {
    #[serde(default, alias = "_id")]
    id: Option<Value>,
    #[serde(default, alias = "product_title")]
    title: Option<String>,
    #[serde(default, alias = "full_content")]
    body: Option<String>,
    #[serde(default, alias = "generic_product_URL", alias = "url")]
    url_template: Option<String>,
    #[serde(default, alias = "description_for_chatbot")]
    description: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default, alias = "last_time_accessed")]
    last_accessed: Option<DateTime<Utc>>,
}

pub fn load_catalog(path: &Path) -> Result<Vec<Ad>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading ad catalog: {}", path.display()))?;
    let ads = parse_catalog(&content, CatalogFormat::from_path(path))
        .with_context(|| format!("Invalid ad catalog: {}", path.display()))?;
    tracing::debug!(ads = ads.len(), path = %path.display(), "loaded catalog");
    Ok(ads)
}

pub fn parse_catalog(content: &str, format: CatalogFormat) -> Result<Vec<Ad>> {
    let values: Vec<Value> = match format {
        CatalogFormat::Json => {
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(content).context("Catalog must be a JSON array of ads")?
            }
        }
        CatalogFormat::JsonLines => {
            let mut values = Vec::new();
            for (line_no, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let value = serde_json::from_str(line)
                    .with_context(|| format!("Invalid JSON on line {}", line_no + 1))?;
                values.push(value);
            }
            values
        }
    };

    Ok(validate_records(values)?)
}

/// Turn raw JSON records into ads, rejecting missing fields and duplicate ids.
pub fn validate_records(values: Vec<Value>) -> Result<Vec<Ad>, CatalogError> {
    let mut seen = HashSet::new();
    let mut ads = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        let record: AdRecord = serde_json::from_value(value)
            .map_err(|source| CatalogError::Malformed { index, source })?;
        let ad = record_to_ad(index, record)?;
        if !seen.insert(ad.id.clone()) {
            return Err(CatalogError::DuplicateId(ad.id.to_string()));
        }
        ads.push(ad);
    }

    Ok(ads)
}

fn record_to_ad(index: usize, record: AdRecord) -> Result<Ad, CatalogError> {
    let id = record
        .id
        .as_ref()
        .and_then(id_from_value)
        .ok_or(CatalogError::MissingField { index, field: "id" })?;
    let title = non_empty(record.title).ok_or(CatalogError::MissingField { index, field: "title" })?;
    let url_template = non_empty(record.url_template)
        .ok_or(CatalogError::MissingField { index, field: "url_template" })?;

    Ok(Ad {
        id: AdId::new(id),
        title,
        body: record.body.unwrap_or_default(),
        url_template,
        description: non_empty(record.description),
        source: non_empty(record.source),
        last_accessed: record.last_accessed,
    })
}

/// Accept string ids, numeric ids, and extended-JSON object ids (`{"$oid": "..."}`).
fn id_from_value(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => map.get("$oid")?.as_str()?.trim().to_string(),
        _ => return None,
    };
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
