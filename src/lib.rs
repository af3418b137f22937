//! adrank: keyword-overlap ad relevance ranking with per-caller exposure filtering
//!
//! Given a caller, a free-text query and a pool of candidate ads, the engine drops the
//! ads already shown to that caller, scores the rest by weighted token overlap with the
//! query, and returns a deterministic top-N ranking.
//!
//! The engine ([`utils::tokenize`], [`rank`], [`exposure::filter_unseen`]) is pure and
//! synchronous. The boundary collaborators ([`catalog`], [`exposure::ExposureStore`],
//! [`delivery`]) load ads, persist delivery events, and serialize the
//! fetch-exposure → rank → record sequence per call.
//!
//! Callers that bypass [`delivery::deliver`] must themselves guarantee at most one
//! concurrent rank-and-record sequence per caller; otherwise racing requests can show
//! the same ad twice.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod domain;
pub mod error;
pub mod exposure;
pub mod rank;
pub mod utils;

pub use domain::{Ad, AdId, AdView, Config, DeliveryEvent, RankingWeights, ScoredCandidate};
pub use exposure::{filter_unseen, ExposureSet};
pub use rank::{rank_ads, rank_unseen, AdRanker};
