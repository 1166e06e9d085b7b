use crate::domain::market::{Granularity, IndicatorSet, MacdReading};
use crate::domain::ports::IndicatorService;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::collections::BTreeMap;
use ta::Next;
use ta::indicators::{
    ExponentialMovingAverage, MovingAverageConvergenceDivergence, RelativeStrengthIndex,
};

/// Decimal places kept on indicator values
const INDICATOR_SCALE: u32 = 8;

/// Indicator computation backed by the `ta` crate.
///
/// Every call builds fresh indicator instances and replays the whole series,
/// so the result depends only on the series passed in.
#[derive(Debug, Clone)]
pub struct TaIndicatorService {
    ema_periods: Vec<usize>,
    rsi_period: usize,
    macd_fast_period: usize,
    macd_slow_period: usize,
    macd_signal_period: usize,
}

impl Default for TaIndicatorService {
    fn default() -> Self {
        Self {
            ema_periods: vec![12, 26],
            rsi_period: 14,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
        }
    }
}

impl TaIndicatorService {
    pub fn new(
        ema_periods: Vec<usize>,
        rsi_period: usize,
        macd_fast_period: usize,
        macd_slow_period: usize,
        macd_signal_period: usize,
    ) -> Self {
        Self {
            ema_periods,
            rsi_period,
            macd_fast_period,
            macd_slow_period,
            macd_signal_period,
        }
    }

    pub fn calculate(&self, closes: &[f64]) -> Result<IndicatorSet> {
        let mut ema = BTreeMap::new();
        for &period in &self.ema_periods {
            if closes.len() < period {
                continue;
            }
            let mut indicator = ExponentialMovingAverage::new(period)
                .map_err(|e| anyhow!("Invalid EMA period {}: {:?}", period, e))?;
            let value = replay(&mut indicator, closes);
            if let Some(v) = value.and_then(to_decimal) {
                ema.insert(period, v);
            }
        }

        // RSI needs `period` price changes
        let rsi = if closes.len() > self.rsi_period {
            let mut indicator = RelativeStrengthIndex::new(self.rsi_period)
                .map_err(|e| anyhow!("Invalid RSI period {}: {:?}", self.rsi_period, e))?;
            replay(&mut indicator, closes).and_then(to_decimal)
        } else {
            None
        };

        let macd = if closes.len() >= self.macd_slow_period + self.macd_signal_period {
            let mut indicator = MovingAverageConvergenceDivergence::new(
                self.macd_fast_period,
                self.macd_slow_period,
                self.macd_signal_period,
            )
            .map_err(|e| anyhow!("Invalid MACD periods: {:?}", e))?;

            let mut last = None;
            for &price in closes {
                last = Some(indicator.next(price));
            }
            last.and_then(|out| {
                Some(MacdReading {
                    line: to_decimal(out.macd)?,
                    signal: to_decimal(out.signal)?,
                    histogram: to_decimal(out.histogram)?,
                })
            })
        } else {
            None
        };

        Ok(IndicatorSet {
            ema,
            rsi,
            macd,
            sample_size: closes.len(),
        })
    }
}

/// `None` for NaN and infinities. Float noise below the kept scale is dropped.
fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(INDICATOR_SCALE).normalize())
}

fn replay<I>(indicator: &mut I, closes: &[f64]) -> Option<f64>
where
    I: Next<f64, Output = f64>,
{
    closes.iter().map(|&price| indicator.next(price)).last()
}

#[async_trait]
impl IndicatorService for TaIndicatorService {
    async fn compute(
        &self,
        _product: &str,
        _granularity: Granularity,
        closes: &[f64],
    ) -> Result<IndicatorSet> {
        self.calculate(closes)
    }
}
