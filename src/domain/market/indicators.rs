use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdReading {
    pub line: Decimal,
    pub signal: Decimal,
    pub histogram: Decimal,
}

/// Indicators derived from one closing-price series.
///
/// Always recomputed wholesale from the full series; nothing here is
/// updated incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    /// EMA keyed by period. Periods longer than the series are absent.
    pub ema: BTreeMap<usize, Decimal>,
    pub rsi: Option<Decimal>,
    pub macd: Option<MacdReading>,
    /// Length of the closing series these values were computed over
    pub sample_size: usize,
}

impl IndicatorSet {
    pub fn ema(&self, period: usize) -> Option<Decimal> {
        self.ema.get(&period).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.ema.is_empty() && self.rsi.is_none() && self.macd.is_none()
    }
}
