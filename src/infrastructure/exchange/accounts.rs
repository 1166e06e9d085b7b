use super::auth::RequestSigner;
use super::market_data::DEFAULT_BASE_URL;
use crate::domain::account::AccountBalance;
use crate::domain::ports::AccountService;
use crate::infrastructure::core::http_client_factory::HttpClientFactory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use tracing::info;

const ACCOUNTS_PATH: &str = "/accounts";

/// Authenticated account listing
pub struct ExchangeAccountService {
    client: ClientWithMiddleware,
    base_url: String,
    signer: RequestSigner,
}

impl ExchangeAccountService {
    pub fn new(base_url: Option<String>, signer: RequestSigner) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            client: HttpClientFactory::create_client(),
            base_url,
            signer,
        }
    }
}

#[async_trait]
impl AccountService for ExchangeAccountService {
    async fn get_accounts(&self) -> Result<Vec<AccountBalance>> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let url = format!("{}{}", self.base_url, ACCOUNTS_PATH);

        let mut request = self.client.get(&url);
        for (name, value) in self.signer.headers(&timestamp, "GET", ACCOUNTS_PATH, "") {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .context("Failed to fetch accounts from exchange")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Exchange accounts fetch failed with {}: {}", status, error_text);
        }

        let accounts: Vec<AccountBalance> = response
            .json()
            .await
            .context("Failed to parse accounts response")?;

        info!(
            "ExchangeAccountService: Loaded {} accounts",
            accounts.len()
        );
        Ok(accounts)
    }
}
