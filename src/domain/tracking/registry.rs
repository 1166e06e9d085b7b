use super::tracker::{Tracker, TrackerSnapshot};
use crate::domain::market::Granularity;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub(crate) type SharedTracker = Arc<RwLock<Tracker>>;

/// product → granularity → tracker.
///
/// Built once at startup and never shrinks. Downstream code only gets owned
/// snapshots; the trackers themselves are mutated by their own scheduler.
#[derive(Default)]
pub struct PriceTrackerRegistry {
    products: BTreeMap<String, BTreeMap<Granularity, SharedTracker>>,
}

impl PriceTrackerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_trackers(trackers: impl IntoIterator<Item = Tracker>) -> Self {
        let mut registry = Self::new();
        for tracker in trackers {
            registry.insert(tracker);
        }
        registry
    }

    pub(crate) fn insert(&mut self, tracker: Tracker) -> SharedTracker {
        let product = tracker.product().to_string();
        let granularity = tracker.granularity();
        let shared = Arc::new(RwLock::new(tracker));
        self.products
            .entry(product)
            .or_default()
            .insert(granularity, shared.clone());
        shared
    }

    pub(crate) fn shared(&self, product: &str, granularity: Granularity) -> Option<SharedTracker> {
        self.products.get(product)?.get(&granularity).cloned()
    }

    pub(crate) fn pairs(&self) -> impl Iterator<Item = (&str, Granularity, &SharedTracker)> {
        self.products.iter().flat_map(|(product, by_granularity)| {
            by_granularity
                .iter()
                .map(move |(granularity, tracker)| (product.as_str(), *granularity, tracker))
        })
    }

    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }

    pub fn granularities(&self, product: &str) -> Vec<Granularity> {
        self.products
            .get(product)
            .map(|g| g.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, product: &str, granularity: Granularity) -> bool {
        self.products
            .get(product)
            .is_some_and(|g| g.contains_key(&granularity))
    }

    /// Number of tracked (product, granularity) pairs
    pub fn len(&self) -> usize {
        self.products.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waits for any in-flight tick of the pair to finish, then copies its state.
    pub async fn snapshot(
        &self,
        product: &str,
        granularity: Granularity,
    ) -> Option<TrackerSnapshot> {
        let shared = self.shared(product, granularity)?;
        let guard = shared.read().await;
        Some(guard.snapshot())
    }

    pub async fn closing_prices(
        &self,
        product: &str,
        granularity: Granularity,
    ) -> Option<Vec<Decimal>> {
        let shared = self.shared(product, granularity)?;
        let guard = shared.read().await;
        Some(guard.closing_series())
    }

    pub async fn snapshots(&self) -> Vec<TrackerSnapshot> {
        let mut out = Vec::with_capacity(self.len());
        for (_, _, shared) in self.pairs() {
            out.push(shared.read().await.snapshot());
        }
        out
    }
}
