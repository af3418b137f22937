//! Per-caller exposure filtering.
//!
//! An ad that was already delivered to a caller is excluded from every later ranking for
//! that caller, whatever the query. The exposure set is keyed by caller and ad only.

use crate::domain::{Ad, AdId};
use std::collections::HashSet;

pub mod store;

pub use store::{ExposureStore, ExposureWindow};

/// Snapshot of the ad ids already shown to one caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExposureSet {
    shown: HashSet<AdId>,
}

impl ExposureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &AdId) -> bool {
        self.shown.contains(id)
    }

    pub fn insert(&mut self, id: AdId) -> bool {
        self.shown.insert(id)
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AdId> {
        self.shown.iter()
    }
}

impl FromIterator<AdId> for ExposureSet {
    fn from_iter<T: IntoIterator<Item = AdId>>(iter: T) -> Self {
        Self { shown: iter.into_iter().collect() }
    }
}

impl Extend<AdId> for ExposureSet {
    fn extend<T: IntoIterator<Item = AdId>>(&mut self, iter: T) {
        self.shown.extend(iter);
    }
}

/// Drop every ad whose id is in `shown`, keeping the remaining ads in pool order.
///
/// An empty result is a normal outcome: the caller has seen the whole catalog.
pub fn filter_unseen<'a, I>(pool: I, shown: &ExposureSet) -> Vec<&'a Ad>
where
    I: IntoIterator<Item = &'a Ad>,
{
    let unseen: Vec<&Ad> = pool.into_iter().filter(|ad| !shown.contains(&ad.id)).collect();
    tracing::debug!(unseen = unseen.len(), shown = shown.len(), "filtered exposed ads");
    unseen
}
