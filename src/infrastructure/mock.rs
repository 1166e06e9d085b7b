use crate::domain::account::AccountBalance;
use crate::domain::market::{Granularity, HistoricRate};
use crate::domain::ports::{AccountService, MarketDataService};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Rows returned per request, like the exchange's own page size
const DEFAULT_HISTORY_LEN: usize = 300;

#[derive(Default)]
struct MockState {
    histories: HashMap<(String, Granularity), Vec<HistoricRate>>,
    failing_products: HashSet<String>,
    requests: Vec<(String, Granularity)>,
}

/// In-memory market data.
///
/// Pairs without an injected history get a deterministic random walk,
/// returned newest → oldest like the real exchange.
#[derive(Clone, Default)]
pub struct MockMarketDataService {
    state: Arc<Mutex<MockState>>,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Rows must be given newest → oldest.
    pub fn set_history(&self, product: &str, granularity: Granularity, rows: Vec<HistoricRate>) {
        self.state()
            .histories
            .insert((product.to_string(), granularity), rows);
    }

    /// Every request for `product` fails.
    pub fn fail_product(&self, product: &str) {
        self.state().failing_products.insert(product.to_string());
    }

    /// Requests served so far, in arrival order
    pub fn requests(&self) -> Vec<(String, Granularity)> {
        self.state().requests.clone()
    }

    fn synthetic_history(product: &str, granularity: Granularity) -> Vec<HistoricRate> {
        let base_price = if product.contains("BTC") {
            96000.0
        } else if product.contains("ETH") {
            3400.0
        } else if product.contains("LTC") {
            85.0
        } else {
            150.0
        };

        let step = i64::from(granularity.seconds());
        let now = Utc::now().timestamp();
        let end = now - now.rem_euclid(step);

        let mut price: f64 = base_price;
        let mut rows = Vec::with_capacity(DEFAULT_HISTORY_LEN);
        for i in 0..DEFAULT_HISTORY_LEN as u64 {
            // -0.5% .. +0.5% per bucket
            let seed = (i + u64::from(granularity.seconds())) * 1103515245 + 12345;
            let random_val = (((seed / 65536) % 1000) as f64 / 1000.0) - 0.5;
            let open = price;
            let close = price * (1.0 + random_val * 0.01);
            price = close;

            let open = round_price(open);
            let close = round_price(close);
            rows.push(HistoricRate {
                time: end - step * (DEFAULT_HISTORY_LEN as i64 - 1 - i as i64),
                low: open.min(close),
                high: open.max(close),
                open,
                close,
                volume: dec!(1.5),
            });
        }

        rows.reverse();
        rows
    }
}

fn round_price(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO).round_dp(2)
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn get_historic_rates(
        &self,
        product: &str,
        granularity: Granularity,
    ) -> Result<Vec<HistoricRate>> {
        let injected = {
            let mut state = self.state();
            state.requests.push((product.to_string(), granularity));
            if state.failing_products.contains(product) {
                anyhow::bail!("MockMarketDataService: {} is configured to fail", product);
            }
            state
                .histories
                .get(&(product.to_string(), granularity))
                .cloned()
        };

        let rows = injected.unwrap_or_else(|| Self::synthetic_history(product, granularity));
        info!(
            "MockMarketDataService: Serving {} rows for {} @ {}",
            rows.len(),
            product,
            granularity
        );
        Ok(rows)
    }
}

/// Fixed balances for mock mode
pub struct MockAccountService {
    accounts: Vec<AccountBalance>,
}

impl MockAccountService {
    pub fn new() -> Self {
        Self {
            accounts: vec![
                AccountBalance {
                    id: "mock-usd".to_string(),
                    currency: "USD".to_string(),
                    balance: dec!(10000),
                    available: dec!(10000),
                    hold: Decimal::ZERO,
                },
                AccountBalance {
                    id: "mock-btc".to_string(),
                    currency: "BTC".to_string(),
                    balance: dec!(0.25),
                    available: dec!(0.2),
                    hold: dec!(0.05),
                },
            ],
        }
    }
}

impl Default for MockAccountService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountService for MockAccountService {
    async fn get_accounts(&self) -> Result<Vec<AccountBalance>> {
        Ok(self.accounts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_synthetic_history_is_newest_first() {
        let service = MockMarketDataService::new();
        let rows = service
            .get_historic_rates("BTC-USD", Granularity::ONE_MINUTE)
            .await
            .unwrap();

        assert_eq!(rows.len(), DEFAULT_HISTORY_LEN);
        assert!(rows.windows(2).all(|w| w[0].time - w[1].time == 60));
        assert!(rows.iter().all(|r| r.low <= r.high));
        // Consecutive buckets chain: each open is the previous close
        assert!(rows.windows(2).all(|w| w[0].open == w[1].close));
    }

    #[tokio::test]
    async fn test_injected_history_and_failures() {
        let service = MockMarketDataService::new();
        let row = HistoricRate {
            time: 1,
            low: dec!(1),
            high: dec!(2),
            open: dec!(1),
            close: dec!(2),
            volume: dec!(3),
        };
        service.set_history("ETH-USD", Granularity::ONE_HOUR, vec![row.clone()]);
        service.fail_product("SOL-USD");

        let rows = service
            .get_historic_rates("ETH-USD", Granularity::ONE_HOUR)
            .await
            .unwrap();
        assert_eq!(rows, vec![row]);

        assert!(
            service
                .get_historic_rates("SOL-USD", Granularity::ONE_HOUR)
                .await
                .is_err()
        );
        assert_eq!(service.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_accounts() {
        let accounts = MockAccountService::new().get_accounts().await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].currency, "USD");
    }
}
