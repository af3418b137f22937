//! Serving flow: hand a caller its most relevant unseen ad and log it as shown.

use crate::catalog::resolve_pool;
use crate::domain::{Ad, AdView, Config, DeliveryEvent};
use crate::error::DeliveryError;
use crate::exposure::{filter_unseen, ExposureStore};
use crate::rank::AdRanker;
use anyhow::Result;
use chrono::Utc;

/// Replace every occurrence of `placeholder` in `template` with `tracking_id`.
///
/// Plain substring replacement: no escaping, no templating. An empty placeholder leaves
/// the template untouched.
pub fn personalize_url(template: &str, placeholder: &str, tracking_id: &str) -> String {
    if placeholder.is_empty() {
        return template.to_string();
    }
    template.replace(placeholder, tracking_id)
}

pub fn ad_view(ad: &Ad, placeholder: &str, tracking_id: &str) -> AdView {
    AdView {
        ad_id: ad.id.clone(),
        title: ad.title.clone(),
        description: ad.description.clone(),
        url: personalize_url(&ad.url_template, placeholder, tracking_id),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeliveryRequest<'r> {
    pub caller_id: &'r str,
    pub query: &'r str,
    pub tracking_id: &'r str,
}

#[derive(Debug, Clone)]
pub struct Delivery {
    /// The selected ad, stamped with the completion time of its delivery event.
    pub ad: Ad,
    pub view: AdView,
}

/// Select the best unseen ad for the request and record it as shown.
///
/// The pool is the caller's stored pre-ranked list when one exists (ids missing from
/// `catalog` are skipped, ties resolve by rank order), otherwise the whole catalog.
/// Returns `Ok(None)` once the caller has seen every ad in the pool. Empty queries are
/// logged as rejected events and reported as [`DeliveryError::EmptyQuery`].
pub fn deliver(
    store: &mut ExposureStore,
    catalog: &[Ad],
    request: &DeliveryRequest<'_>,
    config: &Config,
) -> Result<Option<Delivery>> {
    if request.caller_id.trim().is_empty() {
        return Err(DeliveryError::EmptyCaller.into());
    }

    if request.query.trim().is_empty() {
        let now = Utc::now();
        store.record(&DeliveryEvent {
            caller_id: request.caller_id.to_string(),
            query: request.query.to_string(),
            ad_id: None,
            received_at: now,
            completed_at: Some(now),
            detail: Some(DeliveryError::EmptyQuery.to_string()),
        })?;
        tracing::warn!(caller = request.caller_id, "rejected delivery without query");
        return Err(DeliveryError::EmptyQuery.into());
    }

    let pool: Vec<&Ad> = match store.candidates(request.caller_id)? {
        Some(ranked_ids) => resolve_pool(catalog, &ranked_ids),
        None => catalog.iter().collect(),
    };

    let ranker = AdRanker::with_weights(config.weights());
    let mut selected = None;
    let event = store.select_and_record(request.caller_id, request.query, |shown| {
        selected = ranker.most_relevant(filter_unseen(pool.iter().copied(), shown), request.query);
        selected.map(|ad| ad.id.clone())
    })?;

    let Some(ad) = selected else {
        tracing::info!(caller = request.caller_id, "no unseen ads left for caller");
        return Ok(None);
    };

    // Same instant as the logged event, so `ExposureStore::last_accessed` agrees.
    let mut ad = ad.clone();
    ad.touch(event.completed_at.unwrap_or(event.received_at));
    let view = ad_view(&ad, &config.tracking_placeholder, request.tracking_id);
    tracing::info!(caller = request.caller_id, ad = %ad.id, "delivered ad");
    Ok(Some(Delivery { ad, view }))
}
