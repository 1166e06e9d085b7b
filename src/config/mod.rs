//! Configuration module for the candle tracker.
//!
//! Values come from environment variables (optionally loaded from a dotenv
//! file by the binary), organized by concern: tracking, Indicators,
//! Exchange, and Observability.

mod exchange_config;
mod indicator_config;
mod observability_config;

pub use exchange_config::ExchangeEnvConfig;
pub use indicator_config::IndicatorEnvConfig;
pub use observability_config::ObservabilityEnvConfig;

use crate::domain::errors::TrackerError;
use crate::domain::market::Granularity;
use std::env;
use std::num::NonZeroUsize;
use std::str::FromStr;

const DEFAULT_PRODUCTS: &str = "BTC-USD";
const DEFAULT_GRANULARITIES: &str = "60,300,900";

/// Where historic rates and balances come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Mock,
    Exchange,
}

impl FromStr for Mode {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(Mode::Mock),
            "exchange" => Ok(Mode::Exchange),
            _ => Err(TrackerError::configuration(format!(
                "Invalid MODE: {}. Must be 'mock' or 'exchange'",
                s
            ))),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub products: Vec<String>,
    pub granularities: Vec<Granularity>,
    /// CandleStore capacity per tracked pair
    pub price_cache_size: NonZeroUsize,
    pub indicators: IndicatorEnvConfig,
    pub exchange: ExchangeEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, TrackerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TrackerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = Mode::from_str(&lookup_or(&lookup, "MODE", "mock"))?;
        let products = parse_products(&lookup_or(&lookup, "PRODUCTS", DEFAULT_PRODUCTS))?;
        let granularities =
            parse_granularities(&lookup_or(&lookup, "GRANULARITIES", DEFAULT_GRANULARITIES))?;
        let price_cache_size = parse_cache_size(lookup("PRICE_CACHE_SIZE"))?;

        Ok(Self {
            mode,
            products,
            granularities,
            price_cache_size,
            indicators: IndicatorEnvConfig::from_lookup(&lookup)?,
            exchange: ExchangeEnvConfig::from_lookup(&lookup),
            observability: ObservabilityEnvConfig::from_lookup(&lookup)?,
        })
    }

    /// Replace the product list (CLI override).
    pub fn with_products(mut self, raw: &str) -> Result<Self, TrackerError> {
        self.products = parse_products(raw)?;
        Ok(self)
    }

    /// Replace the granularity list (CLI override).
    pub fn with_granularities(mut self, raw: &str) -> Result<Self, TrackerError> {
        self.granularities = parse_granularities(raw)?;
        Ok(self)
    }

    /// Number of (product, granularity) pairs that will be tracked
    pub fn pair_count(&self) -> usize {
        self.products.len() * self.granularities.len()
    }
}

pub(crate) fn lookup_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Comma-separated list, blanks dropped
pub(crate) fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_products(raw: &str) -> Result<Vec<String>, TrackerError> {
    let mut products: Vec<String> = Vec::new();
    for product in split_list(raw) {
        let product = product.to_uppercase();
        if !products.contains(&product) {
            products.push(product);
        }
    }
    if products.is_empty() {
        return Err(TrackerError::configuration("PRODUCTS must name at least one product"));
    }
    Ok(products)
}

fn parse_granularities(raw: &str) -> Result<Vec<Granularity>, TrackerError> {
    let mut granularities = Vec::new();
    for item in split_list(raw) {
        let granularity = Granularity::from_str(item)
            .map_err(|e| TrackerError::configuration(format!("GRANULARITIES: {}", e)))?;
        if !granularities.contains(&granularity) {
            granularities.push(granularity);
        }
    }
    if granularities.is_empty() {
        return Err(TrackerError::configuration(
            "GRANULARITIES must name at least one granularity",
        ));
    }
    Ok(granularities)
}

fn parse_cache_size(raw: Option<String>) -> Result<NonZeroUsize, TrackerError> {
    let raw = raw.ok_or_else(|| TrackerError::configuration("PRICE_CACHE_SIZE is required"))?;
    raw.trim()
        .parse::<usize>()
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| {
            TrackerError::configuration(format!(
                "PRICE_CACHE_SIZE must be a positive integer, got '{}'",
                raw
            ))
        })
}
