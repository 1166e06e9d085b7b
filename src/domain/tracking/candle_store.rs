use crate::domain::market::Candle;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// Bounded history of closed candles for one (product, granularity) pair.
///
/// Ordered oldest → newest. After every append the oldest candles are
/// evicted until `len() <= capacity()` (FIFO, not LRU).
#[derive(Debug, Clone)]
pub struct CandleStore {
    candles: VecDeque<Candle>,
    capacity: NonZeroUsize,
}

impl CandleStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            candles: VecDeque::with_capacity(capacity.get() + 1),
            capacity,
        }
    }

    /// Builds a store from chronologically ordered candles, keeping only the
    /// most recent `capacity` of them.
    pub fn with_history<I>(capacity: NonZeroUsize, history: I) -> Self
    where
        I: IntoIterator<Item = Candle>,
    {
        let mut store = Self::new(capacity);
        store.candles.extend(history);
        store.trim();
        store
    }

    /// Adds a closed candle at the newest end, then trims.
    /// Returns how many candles were evicted.
    pub fn append(&mut self, candle: Candle) -> usize {
        self.candles.push_back(candle);
        self.trim()
    }

    fn trim(&mut self) -> usize {
        let excess = self.candles.len().saturating_sub(self.capacity.get());
        self.candles.drain(..excess);
        excess
    }

    /// Closing prices, oldest → newest.
    pub fn snapshot(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Owned copies of the stored candles, oldest → newest.
    pub fn candles(&self) -> Vec<Candle> {
        self.candles.iter().copied().collect()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cap(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn closes(prices: &[i64]) -> Vec<Candle> {
        prices
            .iter()
            .map(|p| Candle::flat(Decimal::from(*p)))
            .collect()
    }

    #[test]
    fn test_append_below_capacity_keeps_everything() {
        let mut store = CandleStore::new(cap(3));
        assert!(store.is_empty());

        assert_eq!(store.append(Candle::flat(dec!(1))), 0);
        assert_eq!(store.append(Candle::flat(dec!(2))), 0);

        assert_eq!(store.len(), 2);
        assert_eq!(store.snapshot(), vec![dec!(1), dec!(2)]);
    }

    #[test]
    fn test_append_evicts_oldest_first() {
        let mut store = CandleStore::with_history(cap(3), closes(&[1, 2, 3]));

        assert_eq!(store.append(Candle::flat(dec!(4))), 1);
        assert_eq!(store.snapshot(), vec![dec!(2), dec!(3), dec!(4)]);

        store.append(Candle::flat(dec!(5)));
        assert_eq!(store.snapshot(), vec![dec!(3), dec!(4), dec!(5)]);
        assert_eq!(store.len(), store.capacity());
    }

    #[test]
    fn test_with_history_keeps_most_recent() {
        let store = CandleStore::with_history(cap(4), closes(&[1, 2, 3, 4, 5, 6, 7]));
        assert_eq!(store.len(), 4);
        assert_eq!(store.snapshot(), vec![dec!(4), dec!(5), dec!(6), dec!(7)]);
        assert_eq!(store.last().unwrap().close, dec!(7));
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut store = CandleStore::new(cap(5));
        for i in 0..50 {
            store.append(Candle::flat(Decimal::from(i)));
            assert!(store.len() <= 5);
        }
        assert_eq!(
            store.snapshot(),
            vec![dec!(45), dec!(46), dec!(47), dec!(48), dec!(49)]
        );
    }

    #[test]
    fn test_capacity_of_one() {
        let mut store = CandleStore::new(cap(1));
        store.append(Candle::flat(dec!(1)));
        store.append(Candle::flat(dec!(2)));
        assert_eq!(store.snapshot(), vec![dec!(2)]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = CandleStore::with_history(cap(2), closes(&[10, 20]));
        let mut copy = store.candles();
        copy[0].close = dec!(999);
        assert_eq!(store.snapshot(), vec![dec!(10), dec!(20)]);
    }
}
