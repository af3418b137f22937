//! Ad ranking by weighted keyword overlap

use crate::domain::{Ad, RankingWeights};
use crate::exposure::{filter_unseen, ExposureSet};

pub mod ranker;
pub mod scorer;

pub use ranker::AdRanker;
pub use scorer::{cumulative_score, score};

pub fn rank_ads<'a, S: AsRef<str>>(pool: &'a [Ad], queries: &[S], n: usize) -> Vec<&'a Ad> {
    rank_ads_with_weights(pool, queries, n, RankingWeights::default())
}

pub fn rank_ads_with_weights<'a, S: AsRef<str>>(
    pool: &'a [Ad],
    queries: &[S],
    n: usize,
    weights: RankingWeights,
) -> Vec<&'a Ad> {
    AdRanker::with_weights(weights).rank(pool, queries, n)
}

/// Rank the ads of `pool` that are not in the caller's exposure set.
///
/// This is the serving entry point: exposed ads are excluded before scoring, so they can
/// never reappear however well they match. An exhausted pool gives an empty ranking.
pub fn rank_unseen<'a, S: AsRef<str>>(
    pool: &'a [Ad],
    shown: &ExposureSet,
    queries: &[S],
    n: usize,
    weights: RankingWeights,
) -> Vec<&'a Ad> {
    let unseen = filter_unseen(pool, shown);
    AdRanker::with_weights(weights).rank(unseen, queries, n)
}
