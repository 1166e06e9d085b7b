//! Exchange endpoint and credentials.

use super::lookup_or;
use crate::infrastructure::exchange::market_data::DEFAULT_BASE_URL;
use std::fmt;

#[derive(Clone, Default)]
pub struct ExchangeEnvConfig {
    pub api_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_passphrase: String,
}

impl ExchangeEnvConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_url: lookup_or(lookup, "EXCHANGE_API_URL", DEFAULT_BASE_URL),
            api_key: lookup_or(lookup, "EXCHANGE_API_KEY", ""),
            api_secret: lookup_or(lookup, "EXCHANGE_API_SECRET", ""),
            api_passphrase: lookup_or(lookup, "EXCHANGE_API_PASSPHRASE", ""),
        }
    }

    /// Account balances need all three credentials
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty() && !self.api_passphrase.is_empty()
    }
}

impl fmt::Debug for ExchangeEnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeEnvConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key)
            .field("has_credentials", &self.has_credentials())
            .finish()
    }
}
