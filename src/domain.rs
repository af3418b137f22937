//! Core value types shared by the engine and its boundary collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Placeholder found in generic destination URLs, replaced by a caller's tracking token.
pub const DEFAULT_TRACKING_PLACEHOLDER: &str = "{amazon_tracking_id}";

/// Opaque, stable ad identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdId(String);

impl AdId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AdId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AdId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A validated advertisement.
///
/// Ads are built once at the catalog boundary (see [`crate::catalog`]) and treated as
/// read-only snapshots by the engine. `last_accessed` is bookkeeping only and never
/// influences scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ad {
    pub id: AdId,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub url_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl Ad {
    pub fn new(id: impl Into<AdId>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            url_template: String::new(),
            description: None,
            source: None,
            last_accessed: None,
        }
    }

    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Stamp the ad as selected at `at`.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_accessed = Some(at);
    }
}

/// An ad paired with its (cumulative) relevance score for one ranking call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredCandidate<'a> {
    pub ad: &'a Ad,
    pub score: u64,
}

/// Relative weight of a title match versus a body match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingWeights {
    pub title: u32,
    pub body: u32,
}

impl RankingWeights {
    pub fn new(title: u32, body: u32) -> Self {
        Self { title, body }
    }
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self { title: 3, body: 1 }
    }
}

/// One delivery attempt for a caller, as persisted by the exposure store.
///
/// Only events carrying an `ad_id` contribute to the caller's exposure set; rejected
/// queries and exhausted catalogs are logged with `ad_id: None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEvent {
    pub caller_id: String,
    pub query: String,
    pub ad_id: Option<AdId>,
    pub received_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub detail: Option<String>,
}

/// Caller-facing projection of an ad with its destination URL personalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdView {
    pub ad_id: AdId,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
}

/// Engine and boundary configuration.
///
/// Precedence when loaded through [`crate::config`]: CLI > environment > file > defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title_weight: u32,
    pub body_weight: u32,
    pub top_n: usize,
    pub prerank_size: usize,
    pub per_query_limit: usize,
    /// Only the most recent K shown ads are excluded when set; unbounded otherwise.
    pub exposure_window: Option<usize>,
    pub tracking_placeholder: String,
    pub db_path: PathBuf,
}

impl Config {
    pub fn weights(&self) -> RankingWeights {
        RankingWeights::new(self.title_weight, self.body_weight)
    }
}

impl Default for Config {
    fn default() -> Self {
        let weights = RankingWeights::default();
        Self {
            title_weight: weights.title,
            body_weight: weights.body,
            top_n: 1,
            prerank_size: 20,
            per_query_limit: 100,
            exposure_window: None,
            tracking_placeholder: DEFAULT_TRACKING_PLACEHOLDER.to_string(),
            db_path: PathBuf::from(".adrank/exposure.sqlite"),
        }
    }
}
