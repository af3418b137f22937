//! Weighted keyword-overlap scoring

use crate::domain::{Ad, RankingWeights};
use crate::utils::tokenize;
use std::collections::HashSet;

/// Token sets of an ad's scored fields, computed once per ranking call.
#[derive(Debug, Clone, Default)]
pub struct AdTokens {
    title: HashSet<String>,
    body: HashSet<String>,
}

impl AdTokens {
    pub fn of(ad: &Ad) -> Self {
        Self { title: tokenize(&ad.title), body: tokenize(&ad.body) }
    }
}

/// Score one ad against one query.
///
/// `weights.title * |Q ∩ T| + weights.body * |Q ∩ B|`. Only set intersection sizes
/// matter; an ad with no overlap scores exactly 0.
pub fn score(ad: &Ad, query: &str, weights: RankingWeights) -> u64 {
    score_tokens(&AdTokens::of(ad), &tokenize(query), weights)
}

/// Sum of the per-query scores of `ad` over `queries`.
pub fn cumulative_score<S: AsRef<str>>(ad: &Ad, queries: &[S], weights: RankingWeights) -> u64 {
    let tokens = AdTokens::of(ad);
    queries.iter().map(|q| score_tokens(&tokens, &tokenize(q.as_ref()), weights)).sum()
}

pub fn score_tokens(ad: &AdTokens, query: &HashSet<String>, weights: RankingWeights) -> u64 {
    let title_hits = overlap(query, &ad.title);
    let body_hits = overlap(query, &ad.body);
    u64::from(weights.title) * title_hits + u64::from(weights.body) * body_hits
}

fn overlap(a: &HashSet<String>, b: &HashSet<String>) -> u64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|token| large.contains(*token)).count() as u64
}
