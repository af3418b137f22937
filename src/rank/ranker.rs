//! Top-N ad ranking with stable tie-breaking

use crate::domain::{Ad, RankingWeights, ScoredCandidate};
use crate::rank::scorer::{score_tokens, AdTokens};
use crate::utils::tokenize;
use rayon::prelude::*;
use std::collections::HashSet;

/// Ranks a candidate pool against one or more queries.
///
/// Stateless: every call is a pure function of the pool snapshot, the queries, the
/// weights and `n`. There is no relevance floor, so a pool whose ads all score 0 still
/// yields its first `n` ads in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdRanker {
    weights: RankingWeights,
}

impl AdRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: RankingWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> RankingWeights {
        self.weights
    }

    /// Cumulative score of every distinct candidate, in pool order.
    ///
    /// A candidate's score is the sum of its per-query scores. Ads sharing an id with an
    /// earlier ad in the pool are dropped: both the position and the content of the first
    /// record are kept, and later records with that id are never scored.
    pub fn score_candidates<'a, I, S>(&self, pool: I, queries: &[S]) -> Vec<ScoredCandidate<'a>>
    where
        I: IntoIterator<Item = &'a Ad>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for ad in pool {
            if seen.insert(&ad.id) {
                candidates.push(ad);
            }
        }

        let query_tokens: Vec<HashSet<String>> =
            queries.iter().map(|q| tokenize(q.as_ref())).collect();
        let weights = self.weights;

        // Indexed collect keeps pool order, which the stable sort relies on.
        candidates
            .par_iter()
            .map(|&ad| {
                let tokens = AdTokens::of(ad);
                let score =
                    query_tokens.iter().map(|q| score_tokens(&tokens, q, weights)).sum::<u64>();
                ScoredCandidate { ad, score }
            })
            .collect()
    }

    /// Highest-scoring `n` candidates with their scores, most relevant first.
    pub fn rank_scored<'a, I, S>(&self, pool: I, queries: &[S], n: usize) -> Vec<ScoredCandidate<'a>>
    where
        I: IntoIterator<Item = &'a Ad>,
        S: AsRef<str>,
    {
        if n == 0 {
            return Vec::new();
        }

        let mut scored = self.score_candidates(pool, queries);
        // `sort_by` is stable: equal scores keep their pool order.
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(n);

        tracing::debug!(
            returned = scored.len(),
            queries = queries.len(),
            top_score = scored.first().map(|c| c.score).unwrap_or(0),
            "ranked candidates"
        );
        scored
    }

    pub fn rank<'a, I, S>(&self, pool: I, queries: &[S], n: usize) -> Vec<&'a Ad>
    where
        I: IntoIterator<Item = &'a Ad>,
        S: AsRef<str>,
    {
        self.rank_scored(pool, queries, n).into_iter().map(|c| c.ad).collect()
    }

    /// The single best ad for `query`, or `None` for an empty pool.
    pub fn most_relevant<'a, I>(&self, pool: I, query: &str) -> Option<&'a Ad>
    where
        I: IntoIterator<Item = &'a Ad>,
    {
        self.rank(pool, &[query], 1).into_iter().next()
    }
}
