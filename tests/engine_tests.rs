//! End-to-end ranking scenarios against the library API

use adrank::rank::{cumulative_score, score};
use adrank::{rank_unseen, Ad, AdId, AdRanker, ExposureSet, RankingWeights};

fn pool() -> Vec<Ad> {
    vec![Ad::new("AdX", "book shelf organizer", ""), Ad::new("AdY", "water flosser", "")]
}

fn shown(ids: &[&str]) -> ExposureSet {
    ids.iter().map(|id| AdId::from(*id)).collect()
}

fn ids(ads: &[&Ad]) -> Vec<String> {
    ads.iter().map(|ad| ad.id.to_string()).collect()
}

const W: RankingWeights = RankingWeights { title: 3, body: 1 };

#[test]
fn best_match_wins_without_history() {
    let pool = pool();
    assert_eq!(score(&pool[0], "book shelf", W), 6);
    assert_eq!(score(&pool[1], "book shelf", W), 0);

    let ranked = rank_unseen(&pool, &ExposureSet::new(), &["book shelf"], 1, W);
    assert_eq!(ids(&ranked), vec!["AdX"]);
}

#[test]
fn exposed_best_match_is_skipped() {
    let pool = pool();
    let ranked = rank_unseen(&pool, &shown(&["AdX"]), &["book shelf"], 1, W);
    assert_eq!(ids(&ranked), vec!["AdY"]);
}

#[test]
fn exhausted_pool_gives_empty_result() {
    let pool = pool();
    let ranked = rank_unseen(&pool, &shown(&["AdX", "AdY"]), &["book shelf"], 1, W);
    assert!(ranked.is_empty());
}

#[test]
fn unrelated_query_returns_pool_order() {
    let pool = pool();
    let ranked = rank_unseen(&pool, &ExposureSet::new(), &["unrelated phrase xyz"], 2, W);
    assert_eq!(ids(&ranked), vec!["AdX", "AdY"]);
    let truncated = rank_unseen(&pool, &ExposureSet::new(), &["unrelated phrase xyz"], 1, W);
    assert_eq!(ids(&truncated), vec!["AdX"]);
}

#[test]
fn multi_query_tie_resolved_by_pool_order() {
    let pool = pool();
    let queries = ["water flosser", "book shelf"];
    assert_eq!(cumulative_score(&pool[0], &queries, W), 6);
    assert_eq!(cumulative_score(&pool[1], &queries, W), 6);

    let scored = AdRanker::with_weights(W).rank_scored(&pool, &queries, 2);
    assert_eq!(scored[0].ad.id.as_str(), "AdX");
    assert_eq!(scored[0].score, 6);
    assert_eq!(scored[1].ad.id.as_str(), "AdY");
    assert_eq!(scored[1].score, 6);
}

#[test]
fn exposed_ads_never_reappear_for_any_query_or_n() {
    let pool: Vec<Ad> = (0..12)
        .map(|i| Ad::new(format!("ad-{i}"), format!("widget {i}"), format!("body text {i}")))
        .collect();
    let exposure = shown(&["ad-0", "ad-3", "ad-7", "ad-11"]);

    for query in ["widget", "widget 3", "text 7", "nothing", ""] {
        for n in 1..=15 {
            let ranked = rank_unseen(&pool, &exposure, &[query], n, W);
            assert_eq!(ranked.len(), n.min(pool.len() - exposure.len()));
            assert!(ranked.iter().all(|ad| !exposure.contains(&ad.id)));
        }
    }
}

#[test]
fn identical_inputs_rank_identically() {
    let pool: Vec<Ad> = (0..30)
        .map(|i| {
            let body = if i % 3 == 0 { "match" } else { "" };
            Ad::new(format!("ad-{i}"), "same title", body)
        })
        .collect();
    let first = ids(&rank_unseen(&pool, &ExposureSet::new(), &["same match"], 10, W));
    let second = ids(&rank_unseen(&pool, &ExposureSet::new(), &["same match"], 10, W));
    assert_eq!(first, second);
    assert_eq!(&first[..2], &["ad-0", "ad-3"]);
}
