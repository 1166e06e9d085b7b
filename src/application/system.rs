use crate::application::indicator_refresher::IndicatorRefresher;
use crate::application::scheduler::{CandleScheduler, PairSchedule};
use crate::application::seeder::Seeder;
use crate::config::{Config, Mode};
use crate::domain::account::AccountBalance;
use crate::domain::errors::TrackerError;
use crate::domain::ports::{AccountService, IndicatorService, MarketDataService};
use crate::domain::tracking::PriceTrackerRegistry;
use crate::infrastructure::exchange::{
    ExchangeAccountService, ExchangeMarketDataService, RequestSigner,
};
use crate::infrastructure::mock::{MockAccountService, MockMarketDataService};
use crate::infrastructure::observability::{Metrics, MetricsReporter};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Wired services, ready to seed and start tracking.
pub struct Application {
    pub config: Config,
    pub market_service: Arc<dyn MarketDataService>,
    pub account_service: Option<Arc<dyn AccountService>>,
    pub indicator_service: Arc<dyn IndicatorService>,
    pub metrics: Option<Metrics>,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self> {
        info!(
            "Building candle tracker (Mode: {:?}, {} pairs)...",
            config.mode,
            config.pair_count()
        );

        let (market_service, account_service): (
            Arc<dyn MarketDataService>,
            Option<Arc<dyn AccountService>>,
        ) = match config.mode {
            Mode::Mock => {
                info!("Using Mock services");
                (
                    Arc::new(MockMarketDataService::new()),
                    Some(Arc::new(MockAccountService::new())),
                )
            }
            Mode::Exchange => {
                info!("Using exchange services ({})", config.exchange.api_url);
                let market: Arc<dyn MarketDataService> = Arc::new(
                    ExchangeMarketDataService::builder()
                        .base_url(config.exchange.api_url.clone())
                        .build(),
                );
                (market, Self::exchange_account_service(&config))
            }
        };

        let indicator_service: Arc<dyn IndicatorService> =
            Arc::new(config.indicators.build_service());

        let metrics = if config.observability.enabled {
            Some(Metrics::new()?)
        } else {
            None
        };

        Ok(Self {
            config,
            market_service,
            account_service,
            indicator_service,
            metrics,
        })
    }

    /// Assemble from explicit services instead of `config.mode`.
    pub fn from_parts(
        config: Config,
        market_service: Arc<dyn MarketDataService>,
        account_service: Option<Arc<dyn AccountService>>,
        indicator_service: Arc<dyn IndicatorService>,
    ) -> Self {
        Self {
            config,
            market_service,
            account_service,
            indicator_service,
            metrics: None,
        }
    }

    fn exchange_account_service(config: &Config) -> Option<Arc<dyn AccountService>> {
        if !config.exchange.has_credentials() {
            info!("No exchange credentials configured, skipping account balances");
            return None;
        }

        match RequestSigner::new(
            &config.exchange.api_key,
            &config.exchange.api_secret,
            &config.exchange.api_passphrase,
        ) {
            Ok(signer) => Some(Arc::new(ExchangeAccountService::new(
                Some(config.exchange.api_url.clone()),
                signer,
            ))),
            Err(e) => {
                warn!("Exchange credentials unusable, skipping account balances: {:#}", e);
                None
            }
        }
    }

    /// Seed every pair, then arm one timer per pair.
    ///
    /// Nothing is scheduled unless seeding succeeds for all pairs. Account
    /// balances load in the background and never hold up seeding.
    pub async fn start(&self) -> Result<TrackerHandle, TrackerError> {
        let (accounts_tx, accounts) = watch::channel(None);
        let accounts_task = match self.account_service.clone() {
            Some(service) => Some(tokio::spawn(async move {
                let loaded = load_accounts(service.as_ref()).await;
                accounts_tx.send_replace(Some(loaded));
            })),
            None => {
                accounts_tx.send_replace(Some(Vec::new()));
                None
            }
        };

        let refresher = Arc::new(IndicatorRefresher::new(self.indicator_service.clone()));
        let seeder = Seeder::new(
            self.market_service.clone(),
            refresher.clone(),
            self.config.price_cache_size,
        );
        let registry = match seeder
            .seed_all(&self.config.products, &self.config.granularities)
            .await
        {
            Ok(registry) => Arc::new(registry),
            Err(e) => {
                if let Some(task) = accounts_task {
                    task.abort();
                }
                return Err(e);
            }
        };

        let scheduler = CandleScheduler::new(refresher, self.metrics.clone());
        let schedules = scheduler.start_all(&registry);

        let reporter = self.metrics.as_ref().map(|metrics| {
            metrics.tracked_pairs.set(registry.len() as f64);
            let reporter = MetricsReporter::new(
                registry.clone(),
                metrics.clone(),
                self.config.observability.interval_secs,
            );
            tokio::spawn(reporter.run())
        });

        info!(
            "Candle tracker started: {} pairs scheduled",
            schedules.len()
        );

        Ok(TrackerHandle {
            registry,
            accounts,
            accounts_task,
            metrics: self.metrics.clone(),
            schedules,
            reporter,
        })
    }
}

/// Balances are informational; a failure only logs.
async fn load_accounts(service: &dyn AccountService) -> Vec<AccountBalance> {
    match service.get_accounts().await {
        Ok(accounts) => {
            for account in &accounts {
                debug!(
                    "Account {}: available={} balance={} hold={}",
                    account.currency, account.available, account.balance, account.hold
                );
            }
            info!("Loaded {} account balances", accounts.len());
            accounts
        }
        Err(e) => {
            warn!("Failed to load account balances: {:#}", e);
            Vec::new()
        }
    }
}

/// Running tracker: read access plus shutdown.
pub struct TrackerHandle {
    registry: Arc<PriceTrackerRegistry>,
    /// `None` until the background balance fetch settles
    accounts: watch::Receiver<Option<Vec<AccountBalance>>>,
    accounts_task: Option<JoinHandle<()>>,
    metrics: Option<Metrics>,
    schedules: Vec<PairSchedule>,
    reporter: Option<JoinHandle<()>>,
}

impl TrackerHandle {
    pub fn registry(&self) -> Arc<PriceTrackerRegistry> {
        self.registry.clone()
    }

    /// Balances if the startup fetch has finished. A failed fetch yields an empty list.
    pub fn accounts(&self) -> Option<Vec<AccountBalance>> {
        self.accounts.borrow().clone()
    }

    /// Waits for the startup balance fetch to settle.
    pub async fn loaded_accounts(&self) -> Vec<AccountBalance> {
        let mut accounts = self.accounts.clone();
        let loaded = match accounts.wait_for(Option::is_some).await {
            Ok(value) => value.as_ref().cloned().unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        loaded
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    pub fn schedules(&self) -> &[PairSchedule] {
        &self.schedules
    }

    /// Stops every timer, waiting for in-flight ticks to finish.
    pub async fn shutdown(self) {
        if let Some(reporter) = self.reporter {
            reporter.abort();
        }
        if let Some(task) = self.accounts_task {
            task.abort();
        }
        for schedule in self.schedules {
            schedule.stop().await;
        }
        info!("Candle tracker stopped");
    }
}
