use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// OHLC summary of one granularity period.
///
/// `Candle` is `Copy`: handing a candle to a store always hands over an
/// independent value, so a stored candle can never be changed through the
/// live candle it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Candle {
    pub fn new(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }

    /// A candle collapsed to a single price (open = high = low = close).
    pub fn flat(price: Decimal) -> Self {
        Self::new(price, price, price, price)
    }

    /// Percent move from open to close. Zero when the open is zero.
    pub fn percent_change(&self) -> Decimal {
        if self.open.is_zero() {
            return Decimal::ZERO;
        }
        (self.close - self.open) / self.open * dec!(100)
    }

    /// Distance between the period's high and low.
    pub fn high_low_spread(&self) -> Decimal {
        self.high - self.low
    }

    /// Whether `low <= open, close <= high` holds.
    ///
    /// Exchange data is stored as received, so this is only reported, never enforced.
    pub fn is_consistent(&self) -> bool {
        self.low <= self.high
            && self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high
    }
}

impl fmt::Display for Candle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "O:{} H:{} L:{} C:{}",
            self.open, self.high, self.low, self.close
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_candle_collapses_to_price() {
        let c = Candle::flat(dec!(68000.25));
        assert_eq!(c.open, dec!(68000.25));
        assert_eq!(c.high, dec!(68000.25));
        assert_eq!(c.low, dec!(68000.25));
        assert_eq!(c.close, dec!(68000.25));
        assert_eq!(c.high_low_spread(), Decimal::ZERO);
        assert_eq!(c.percent_change(), Decimal::ZERO);
    }

    #[test]
    fn test_percent_change_and_spread() {
        let c = Candle::new(dec!(100), dec!(112), dec!(95), dec!(110));
        assert_eq!(c.percent_change(), dec!(10));
        assert_eq!(c.high_low_spread(), dec!(17));

        let down = Candle::new(dec!(200), dec!(200), dec!(150), dec!(150));
        assert_eq!(down.percent_change(), dec!(-25));
    }

    #[test]
    fn test_percent_change_with_zero_open() {
        let c = Candle::new(Decimal::ZERO, dec!(5), Decimal::ZERO, dec!(5));
        assert_eq!(c.percent_change(), Decimal::ZERO);
    }

    #[test]
    fn test_consistency_is_reported_not_enforced() {
        let good = Candle::new(dec!(10), dec!(12), dec!(9), dec!(11));
        assert!(good.is_consistent());

        // Close above the high is kept as-is
        let odd = Candle::new(dec!(10), dec!(12), dec!(9), dec!(13));
        assert!(!odd.is_consistent());
        assert_eq!(odd.close, dec!(13));
    }

    #[test]
    fn test_copy_is_independent() {
        let mut live = Candle::flat(dec!(5));
        let closed = live;
        live.close = dec!(6);
        assert_eq!(closed.close, dec!(5));
    }
}
