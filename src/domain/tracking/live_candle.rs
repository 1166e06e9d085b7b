use crate::domain::market::Candle;
use rust_decimal::Decimal;

/// Holds the single in-progress candle of a pair.
///
/// There is no open/closed flag: the current candle is always the one
/// accumulating. Nothing widens high/low between ticks, so the candle stays
/// flat at the previous close until the next period closes it.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveCandleAggregator {
    current: Candle,
}

impl LiveCandleAggregator {
    /// Starts flat at the last known closing price
    pub fn starting_at(last_close: Decimal) -> Self {
        Self {
            current: Candle::flat(last_close),
        }
    }

    pub fn current(&self) -> Candle {
        self.current
    }

    /// Closes the current period.
    ///
    /// Returns the closed candle by value and reopens the live candle at its
    /// close: `open = high = low = close = previous close`.
    pub fn close_period(&mut self) -> Candle {
        let closed = self.current;
        self.current = Candle::flat(closed.close);
        closed
    }
}
