//! Exchange market data over REST
//!
//! `GET {base_url}/products/{product}/candles?granularity={seconds}` returns up
//! to 300 rows of `[time, low, high, open, close, volume]`, newest first.

use crate::domain::market::{Granularity, HistoricRate};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::core::http_client_factory::{
    HttpClientFactory, build_url_with_query, percent_encode,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.exchange.coinbase.com";

pub struct ExchangeMarketDataService {
    client: ClientWithMiddleware,
    base_url: String,
}

impl ExchangeMarketDataService {
    pub fn builder() -> ExchangeMarketDataServiceBuilder {
        ExchangeMarketDataServiceBuilder::default()
    }

    fn candles_url(&self, product: &str, granularity: Granularity) -> String {
        let endpoint = format!(
            "{}/products/{}/candles",
            self.base_url,
            percent_encode(product)
        );
        build_url_with_query(
            &endpoint,
            &[("granularity", granularity.seconds().to_string())],
        )
    }
}

#[derive(Default)]
pub struct ExchangeMarketDataServiceBuilder {
    base_url: Option<String>,
    client: Option<ClientWithMiddleware>,
}

impl ExchangeMarketDataServiceBuilder {
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn client(mut self, client: ClientWithMiddleware) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> ExchangeMarketDataService {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        ExchangeMarketDataService {
            client: self.client.unwrap_or_else(HttpClientFactory::create_client),
            base_url,
        }
    }
}

/// Parses a candles payload, skipping malformed rows.
pub fn parse_historic_rates(payload: &Value) -> Result<Vec<HistoricRate>> {
    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(obj) => {
            let message = obj
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unexpected object");
            anyhow::bail!("Exchange returned an error payload: {}", message);
        }
        other => anyhow::bail!("Unexpected candles payload: {}", other),
    };

    let mut rates = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows {
        match HistoricRate::from_row(row) {
            Some(rate) => rates.push(rate),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(
            "ExchangeMarketDataService: Skipped {} malformed candle rows",
            skipped
        );
    }
    Ok(rates)
}

#[async_trait]
impl MarketDataService for ExchangeMarketDataService {
    async fn get_historic_rates(
        &self,
        product: &str,
        granularity: Granularity,
    ) -> Result<Vec<HistoricRate>> {
        let url = self.candles_url(product, granularity);
        debug!("ExchangeMarketDataService: GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch candles for {}", product))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Exchange candles fetch for {} failed with {}: {}",
                product,
                status,
                error_text
            );
        }

        let payload: Value = response
            .json()
            .await
            .context("Failed to parse candles response")?;
        let rates = parse_historic_rates(&payload)?;

        info!(
            "ExchangeMarketDataService: Fetched {} rows for {} @ {}",
            rates.len(),
            product,
            granularity
        );
        Ok(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_candles_url() {
        let service = ExchangeMarketDataService::builder()
            .base_url("https://api.example.com/".to_string())
            .build();
        assert_eq!(
            service.candles_url("BTC-USD", Granularity::FIVE_MINUTES),
            "https://api.example.com/products/BTC-USD/candles?granularity=300"
        );
    }

    #[test]
    fn test_parse_skips_malformed_rows() {
        let payload = json!([
            [1700000060, 99.5, 101.25, 100.0, 101.0, 12.5],
            [1700000000, "bad", 101.0, 100.0, 100.5, 3.0],
            [1699999940, 98.0, 100.5, 99.0, 100.0]
        ]);
        let rates = parse_historic_rates(&payload).unwrap();

        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].time, 1700000060);
        assert_eq!(rates[0].high, dec!(101.25));
        assert_eq!(rates[0].close, dec!(101.0));
    }

    #[test]
    fn test_parse_error_payload() {
        let payload = json!({ "message": "NotFound" });
        let err = parse_historic_rates(&payload).unwrap_err();
        assert!(err.to_string().contains("NotFound"));
    }
}
