use crate::application::indicator_refresher::IndicatorRefresher;
use crate::domain::errors::TrackerError;
use crate::domain::market::{Candle, Granularity, HistoricRate};
use crate::domain::ports::MarketDataService;
use crate::domain::tracking::{CandleStore, PriceTrackerRegistry, Tracker};
use futures::future::try_join_all;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One-time bootstrap of trackers from exchange history.
///
/// For each pair this:
/// 1. Fetches historic rates (newest → oldest)
/// 2. Reverses them to oldest → newest
/// 3. Trims to the configured capacity
/// 4. Starts the live candle flat at the last close
/// 5. Runs one indicator refresh
pub struct Seeder {
    market_service: Arc<dyn MarketDataService>,
    refresher: Arc<IndicatorRefresher>,
    capacity: NonZeroUsize,
}

impl Seeder {
    pub fn new(
        market_service: Arc<dyn MarketDataService>,
        refresher: Arc<IndicatorRefresher>,
        capacity: NonZeroUsize,
    ) -> Self {
        Self {
            market_service,
            refresher,
            capacity,
        }
    }

    /// Seed every (product, granularity) pair.
    ///
    /// Pairs are fetched concurrently. The first failure aborts the whole
    /// run and no registry is returned.
    pub async fn seed_all(
        &self,
        products: &[String],
        granularities: &[Granularity],
    ) -> Result<PriceTrackerRegistry, TrackerError> {
        let jobs = products.iter().flat_map(|product| {
            granularities
                .iter()
                .map(move |granularity| self.seed_pair(product, *granularity))
        });

        let trackers = try_join_all(jobs).await?;

        info!(
            "Seeder: Seeded {} trackers ({} products x {} granularities)",
            trackers.len(),
            products.len(),
            granularities.len()
        );
        Ok(PriceTrackerRegistry::from_trackers(trackers))
    }

    pub async fn seed_pair(
        &self,
        product: &str,
        granularity: Granularity,
    ) -> Result<Tracker, TrackerError> {
        info!(
            "Seeder: {}: Getting historical data at every {} minutes",
            product,
            granularity.minutes()
        );

        let rates = self
            .market_service
            .get_historic_rates(product, granularity)
            .await
            .map_err(|e| TrackerError::SeedFetch {
                product: product.to_string(),
                granularity,
                reason: format!("{:#}", e),
            })?;

        let total = rates.len();
        let candles = chronological_candles(rates);

        let inconsistent = candles.iter().filter(|c| !c.is_consistent()).count();
        if inconsistent > 0 {
            warn!(
                "Seeder: {} @ {}: {} of {} historical candles have open/close outside high/low",
                product, granularity, inconsistent, total
            );
        }

        let store = CandleStore::with_history(self.capacity, candles);
        debug!(
            "Seeder: {}: Total historical prices @ {} minutes: {} (kept {})",
            product,
            granularity.minutes(),
            total,
            store.len()
        );

        let mut tracker = Tracker::seeded(product, granularity, store)?;
        self.refresher
            .refresh(&mut tracker, None)
            .await
            .map_err(|e| match e {
                TrackerError::TickComputation {
                    product,
                    granularity,
                    reason,
                } => TrackerError::SeedFetch {
                    product,
                    granularity,
                    reason: format!("initial indicator computation failed: {}", reason),
                },
                other => other,
            })?;

        Ok(tracker)
    }
}

/// Exchange history arrives newest → oldest; everything downstream assumes
/// oldest → newest.
fn chronological_candles(mut rates: Vec<HistoricRate>) -> Vec<Candle> {
    rates.reverse();
    rates.iter().map(HistoricRate::to_candle).collect()
}
