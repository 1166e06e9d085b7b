use crate::domain::market::Granularity;
use thiserror::Error;

/// Errors raised while building or driving price trackers
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Failed to fetch historic rates for {product} @ {granularity}: {reason}")]
    SeedFetch {
        product: String,
        granularity: Granularity,
        reason: String,
    },

    #[error("No historic rates returned for {product} @ {granularity}")]
    EmptyHistory {
        product: String,
        granularity: Granularity,
    },

    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("Tick failed for {product} @ {granularity}: {reason}")]
    TickComputation {
        product: String,
        granularity: Granularity,
        reason: String,
    },
}

impl TrackerError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        TrackerError::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether the error happened during startup (and therefore aborts it)
    pub fn is_startup_failure(&self) -> bool {
        !matches!(self, TrackerError::TickComputation { .. })
    }
}
