//! Indicator period configuration.

use super::{lookup_or, split_list};
use crate::domain::errors::TrackerError;
use crate::infrastructure::indicators::TaIndicatorService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorEnvConfig {
    pub ema_periods: Vec<usize>,
    pub rsi_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
}

impl Default for IndicatorEnvConfig {
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

impl IndicatorEnvConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, TrackerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_emas = lookup_or(lookup, "EMA_PERIODS", "12,26");
        let mut ema_periods = Vec::new();
        for item in split_list(&raw_emas) {
            let period = parse_period("EMA_PERIODS", item)?;
            if !ema_periods.contains(&period) {
                ema_periods.push(period);
            }
        }

        let config = Self {
            ema_periods,
            rsi_period: parse_period("RSI_PERIOD", &lookup_or(lookup, "RSI_PERIOD", "14"))?,
            macd_fast_period: parse_period(
                "MACD_FAST_PERIOD",
                &lookup_or(lookup, "MACD_FAST_PERIOD", "12"),
            )?,
            macd_slow_period: parse_period(
                "MACD_SLOW_PERIOD",
                &lookup_or(lookup, "MACD_SLOW_PERIOD", "26"),
            )?,
            macd_signal_period: parse_period(
                "MACD_SIGNAL_PERIOD",
                &lookup_or(lookup, "MACD_SIGNAL_PERIOD", "9"),
            )?,
        };

        if config.macd_fast_period >= config.macd_slow_period {
            return Err(TrackerError::configuration(format!(
                "MACD_FAST_PERIOD ({}) must be below MACD_SLOW_PERIOD ({})",
                config.macd_fast_period, config.macd_slow_period
            )));
        }
        Ok(config)
    }

    pub fn build_service(&self) -> TaIndicatorService {
        TaIndicatorService::new(
            self.ema_periods.clone(),
            self.rsi_period,
            self.macd_fast_period,
            self.macd_slow_period,
            self.macd_signal_period,
        )
    }
}

fn parse_period(key: &str, raw: &str) -> Result<usize, TrackerError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| {
            TrackerError::configuration(format!("{} must be a positive integer, got '{}'", key, raw))
        })
}
