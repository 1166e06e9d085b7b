//! Observability configuration parsing.

use super::lookup_or;
use crate::domain::errors::TrackerError;

/// Observability environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    /// Seconds between METRICS_JSON reports
    pub interval_secs: u64,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, TrackerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = lookup_or(lookup, "OBSERVABILITY_ENABLED", "true")
            .trim()
            .parse::<bool>()
            .unwrap_or(true);

        let raw_interval = lookup_or(lookup, "OBSERVABILITY_INTERVAL", "60");
        let interval_secs = raw_interval
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| {
                TrackerError::configuration(format!(
                    "OBSERVABILITY_INTERVAL must be a positive number of seconds, got '{}'",
                    raw_interval
                ))
            })?;

        Ok(Self {
            enabled,
            interval_secs,
        })
    }
}
