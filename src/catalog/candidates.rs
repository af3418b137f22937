//! Candidate gathering and catalog pre-ranking for a set of interest queries

use crate::domain::{Ad, AdId, Config, RankingWeights};
use crate::rank::AdRanker;
use crate::utils::tokenize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrerankOptions {
    /// Number of ads kept after ranking.
    pub size: usize,
    /// Candidates taken per query before ranking.
    pub per_query_limit: usize,
    pub weights: RankingWeights,
}

impl Default for PrerankOptions {
    fn default() -> Self {
        Self { size: 20, per_query_limit: 100, weights: RankingWeights::default() }
    }
}

impl From<&Config> for PrerankOptions {
    fn from(config: &Config) -> Self {
        Self {
            size: config.prerank_size,
            per_query_limit: config.per_query_limit,
            weights: config.weights(),
        }
    }
}

/// Ads matching at least one query, deduplicated in first-seen order.
///
/// An ad matches a query when any of the query's words occurs, case-insensitively, as a
/// substring of its title or body. A query without words matches every ad. Each query
/// contributes at most `per_query_limit` ads, taken in catalog order.
pub fn gather_candidates<'a, S: AsRef<str>>(
    catalog: &'a [Ad],
    queries: &[S],
    per_query_limit: usize,
) -> Vec<&'a Ad> {
    let lowered: Vec<(String, String)> =
        catalog.iter().map(|ad| (ad.title.to_lowercase(), ad.body.to_lowercase())).collect();

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for query in queries {
        let words = tokenize(query.as_ref());
        let matches = catalog
            .iter()
            .zip(lowered.iter())
            .filter(|(_, (title, body))| {
                words.is_empty()
                    || words.iter().any(|w| title.contains(w.as_str()) || body.contains(w.as_str()))
            })
            .take(per_query_limit);

        for (ad, _) in matches {
            if seen.insert(&ad.id) {
                out.push(ad);
            }
        }
    }

    tracing::debug!(candidates = out.len(), queries = queries.len(), "gathered candidates");
    out
}

/// Pre-rank a catalog for a set of interest queries.
///
/// Candidates gathered from every query are ranked together by their cumulative score
/// across all queries, so ads relevant to several interests rise to the top.
pub fn prerank<'a, S: AsRef<str>>(
    catalog: &'a [Ad],
    queries: &[S],
    options: PrerankOptions,
) -> Vec<&'a Ad> {
    let candidates = gather_candidates(catalog, queries, options.per_query_limit);
    AdRanker::with_weights(options.weights).rank(candidates, queries, options.size)
}

/// Look up pre-ranked ids in the catalog, keeping their order.
///
/// Ids with no ad in the catalog are skipped.
pub fn resolve_pool<'a>(catalog: &'a [Ad], ranked_ids: &[AdId]) -> Vec<&'a Ad> {
    let by_id: HashMap<&AdId, &Ad> = catalog.iter().map(|ad| (&ad.id, ad)).collect();
    let pool: Vec<&Ad> = ranked_ids.iter().filter_map(|id| by_id.get(id).copied()).collect();
    if pool.len() < ranked_ids.len() {
        tracing::debug!(
            missing = ranked_ids.len() - pool.len(),
            "skipped pre-ranked ids missing from catalog"
        );
    }
    pool
}
