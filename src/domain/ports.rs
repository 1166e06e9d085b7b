use crate::domain::account::AccountBalance;
use crate::domain::market::{Granularity, HistoricRate, IndicatorSet};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Historic candles for a product, ordered newest → oldest as the exchange returns them.
    async fn get_historic_rates(
        &self,
        product: &str,
        granularity: Granularity,
    ) -> Result<Vec<HistoricRate>>;
}

#[async_trait]
pub trait AccountService: Send + Sync {
    async fn get_accounts(&self) -> Result<Vec<AccountBalance>>;
}

/// Computes indicators from a closing-price series ordered oldest → newest.
#[async_trait]
pub trait IndicatorService: Send + Sync {
    async fn compute(
        &self,
        product: &str,
        granularity: Granularity,
        closes: &[f64],
    ) -> Result<IndicatorSet>;
}
