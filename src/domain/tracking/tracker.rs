use super::candle_store::CandleStore;
use super::live_candle::LiveCandleAggregator;
use crate::domain::errors::TrackerError;
use crate::domain::market::{Candle, Granularity, IndicatorSet};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// State for one (product, granularity) pair: closed history, the live
/// candle and the latest indicators.
#[derive(Debug, Clone)]
pub struct Tracker {
    product: String,
    granularity: Granularity,
    store: CandleStore,
    live: LiveCandleAggregator,
    indicators: IndicatorSet,
    indicators_stale: bool,
    ticks: u64,
    last_tick_at: Option<DateTime<Utc>>,
}

/// Owned, read-only copy of a tracker handed to downstream consumers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerSnapshot {
    pub product: String,
    pub granularity: Granularity,
    pub candles: Vec<Candle>,
    pub current: Candle,
    pub indicators: IndicatorSet,
    pub indicators_stale: bool,
    pub ticks: u64,
    pub last_tick_at: Option<DateTime<Utc>>,
}

impl TrackerSnapshot {
    /// Closing prices of the stored candles, oldest → newest
    pub fn closes(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.close).collect()
    }
}

impl Tracker {
    /// Primes a tracker from a populated store. The live candle starts flat
    /// at the newest stored close.
    pub fn seeded(
        product: impl Into<String>,
        granularity: Granularity,
        store: CandleStore,
    ) -> Result<Self, TrackerError> {
        let product = product.into();
        let last_close = match store.last() {
            Some(candle) => candle.close,
            None => {
                return Err(TrackerError::EmptyHistory {
                    product,
                    granularity,
                });
            }
        };

        Ok(Self {
            product,
            granularity,
            store,
            live: LiveCandleAggregator::starting_at(last_close),
            indicators: IndicatorSet::default(),
            indicators_stale: true,
            ticks: 0,
            last_tick_at: None,
        })
    }

    /// Closes the live candle into the store and reopens it at the close.
    ///
    /// Returns the candle that was closed.
    pub fn roll(&mut self) -> Candle {
        let closed = self.live.close_period();
        self.store.append(closed);
        self.ticks += 1;
        self.last_tick_at = Some(Utc::now());
        closed
    }

    /// Series fed to indicator computation, oldest → newest.
    ///
    /// The live candle only ever sits at the newest stored close, so the
    /// store's closes are the complete series.
    pub fn closing_series(&self) -> Vec<Decimal> {
        self.store.snapshot()
    }

    pub fn apply_indicators(&mut self, indicators: IndicatorSet) {
        self.indicators = indicators;
        self.indicators_stale = false;
    }

    /// Keeps the previous indicators but flags them as out of date.
    pub fn mark_indicators_stale(&mut self) {
        self.indicators_stale = true;
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn store(&self) -> &CandleStore {
        &self.store
    }

    pub fn current(&self) -> Candle {
        self.live.current()
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    pub fn indicators_stale(&self) -> bool {
        self.indicators_stale
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            product: self.product.clone(),
            granularity: self.granularity,
            candles: self.store.candles(),
            current: self.live.current(),
            indicators: self.indicators.clone(),
            indicators_stale: self.indicators_stale,
            ticks: self.ticks,
            last_tick_at: self.last_tick_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::num::NonZeroUsize;

    fn store_of(capacity: usize, prices: &[Decimal]) -> CandleStore {
        CandleStore::with_history(
            NonZeroUsize::new(capacity).unwrap(),
            prices.iter().map(|p| Candle::flat(*p)),
        )
    }

    #[test]
    fn test_seed_starts_live_candle_at_last_close() {
        let tracker = Tracker::seeded(
            "BTC-USD",
            Granularity::ONE_MINUTE,
            store_of(10, &[dec!(5), dec!(10)]),
        )
        .unwrap();

        assert_eq!(tracker.current(), Candle::flat(dec!(10)));
        assert_eq!(tracker.ticks(), 0);
        assert!(tracker.indicators_stale());
    }

    #[test]
    fn test_seed_with_empty_store_fails() {
        let result = Tracker::seeded("BTC-USD", Granularity::ONE_MINUTE, store_of(10, &[]));
        assert!(matches!(result, Err(TrackerError::EmptyHistory { .. })));
    }

    #[test]
    fn test_roll_appends_and_reopens() {
        let mut tracker = Tracker::seeded(
            "ETH-USD",
            Granularity::FIVE_MINUTES,
            store_of(10, &[dec!(1), dec!(2)]),
        )
        .unwrap();

        let closed = tracker.roll();
        assert_eq!(closed, Candle::flat(dec!(2)));
        assert_eq!(tracker.store().len(), 3);
        assert_eq!(tracker.current(), Candle::flat(closed.close));
        assert_eq!(tracker.ticks(), 1);
    }

    #[test]
    fn test_two_flat_ticks_grow_store_by_two_then_clamp() {
        let mut tracker = Tracker::seeded(
            "ETH-USD",
            Granularity::ONE_MINUTE,
            store_of(4, &[dec!(1), dec!(2)]),
        )
        .unwrap();

        tracker.roll();
        tracker.roll();
        assert_eq!(tracker.store().len(), 4);
        assert_eq!(
            tracker.closing_series(),
            vec![dec!(1), dec!(2), dec!(2), dec!(2)]
        );

        tracker.roll();
        tracker.roll();
        assert_eq!(tracker.store().len(), 4);
        assert_eq!(tracker.closing_series(), vec![dec!(2); 4]);
    }

    #[test]
    fn test_indicator_staleness_flag() {
        let mut tracker =
            Tracker::seeded("BTC-USD", Granularity::ONE_MINUTE, store_of(3, &[dec!(1)])).unwrap();

        let mut set = IndicatorSet::default();
        set.rsi = Some(dec!(55));
        set.sample_size = 1;
        tracker.apply_indicators(set.clone());
        assert!(!tracker.indicators_stale());

        tracker.mark_indicators_stale();
        assert!(tracker.indicators_stale());
        assert_eq!(tracker.indicators(), &set);
    }

    #[test]
    fn test_snapshot_is_an_owned_copy() {
        let mut tracker =
            Tracker::seeded("BTC-USD", Granularity::ONE_MINUTE, store_of(3, &[dec!(7)])).unwrap();
        let before = tracker.snapshot();

        tracker.roll();

        assert_eq!(before.candles.len(), 1);
        assert_eq!(before.ticks, 0);
        assert_eq!(before.closes(), vec![dec!(7)]);
        assert_eq!(tracker.snapshot().candles.len(), 2);
    }
}
