use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

/// Length of one candle period, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Granularity(NonZeroU32);

impl Granularity {
    pub const ONE_MINUTE: Granularity = Granularity::const_seconds(60);
    pub const FIVE_MINUTES: Granularity = Granularity::const_seconds(300);
    pub const FIFTEEN_MINUTES: Granularity = Granularity::const_seconds(900);
    pub const ONE_HOUR: Granularity = Granularity::const_seconds(3600);
    pub const SIX_HOURS: Granularity = Granularity::const_seconds(21600);
    pub const ONE_DAY: Granularity = Granularity::const_seconds(86400);

    const fn const_seconds(seconds: u32) -> Self {
        match NonZeroU32::new(seconds) {
            Some(n) => Granularity(n),
            None => panic!("granularity must be non-zero"),
        }
    }

    /// Returns `None` for a zero-second period.
    pub fn from_seconds(seconds: u32) -> Option<Self> {
        NonZeroU32::new(seconds).map(Granularity)
    }

    pub fn seconds(&self) -> u32 {
        self.0.get()
    }

    /// Period as a timer duration
    pub fn period(&self) -> Duration {
        Duration::from_secs(u64::from(self.seconds()))
    }

    /// Period in (possibly fractional) minutes, for log output
    pub fn minutes(&self) -> f64 {
        f64::from(self.seconds()) / 60.0
    }
}

impl FromStr for Granularity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let named = match trimmed.to_lowercase().as_str() {
            "1m" | "1min" => Some(Granularity::ONE_MINUTE),
            "5m" | "5min" => Some(Granularity::FIVE_MINUTES),
            "15m" | "15min" => Some(Granularity::FIFTEEN_MINUTES),
            "1h" | "1hour" => Some(Granularity::ONE_HOUR),
            "6h" | "6hour" => Some(Granularity::SIX_HOURS),
            "1d" | "1day" => Some(Granularity::ONE_DAY),
            _ => None,
        };
        if let Some(granularity) = named {
            return Ok(granularity);
        }

        let seconds = trimmed.parse::<u32>().map_err(|_| {
            anyhow!(
                "Invalid granularity: '{}'. Use seconds (e.g. 60) or one of 1m, 5m, 15m, 1h, 6h, 1d",
                s
            )
        })?;
        Granularity::from_seconds(seconds)
            .ok_or_else(|| anyhow!("Invalid granularity: '{}'. Must be greater than zero", s))
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = self.seconds();
        if seconds % 60 == 0 {
            write!(f, "{}min", seconds / 60)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}
