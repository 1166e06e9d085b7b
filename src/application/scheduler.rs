use crate::application::indicator_refresher::IndicatorRefresher;
use crate::domain::errors::TrackerError;
use crate::domain::market::{Candle, Granularity};
use crate::domain::tracking::PriceTrackerRegistry;
use crate::domain::tracking::registry::SharedTracker;
use crate::infrastructure::observability::Metrics;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// Drives one periodic timer per (product, granularity) pair.
///
/// Every firing closes the live candle into the store and refreshes the
/// indicators. Ticks of one pair run sequentially on that pair's task and
/// hold the tracker's write lock for the whole transition.
#[derive(Clone)]
pub struct CandleScheduler {
    refresher: Arc<IndicatorRefresher>,
    metrics: Option<Metrics>,
}

/// Running timer for one pair
pub struct PairSchedule {
    product: String,
    granularity: Granularity,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PairSchedule {
    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the timer.
    ///
    /// A tick already in flight completes first; once this returns the pair
    /// is never mutated again.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            error!(
                "CandleScheduler: {} @ {} task ended abnormally: {}",
                self.product, self.granularity, e
            );
        }
        info!(
            "CandleScheduler: {} @ {} stopped",
            self.product, self.granularity
        );
    }
}

impl CandleScheduler {
    pub fn new(refresher: Arc<IndicatorRefresher>, metrics: Option<Metrics>) -> Self {
        Self { refresher, metrics }
    }

    /// Arms a timer for every pair in the registry.
    pub fn start_all(&self, registry: &PriceTrackerRegistry) -> Vec<PairSchedule> {
        registry
            .pairs()
            .map(|(product, granularity, tracker)| {
                self.spawn(product.to_string(), granularity, tracker.clone())
            })
            .collect()
    }

    /// Arms the timer of one pair. `None` when the pair is not tracked.
    pub fn start(
        &self,
        registry: &PriceTrackerRegistry,
        product: &str,
        granularity: Granularity,
    ) -> Option<PairSchedule> {
        let tracker = registry.shared(product, granularity)?;
        Some(self.spawn(product.to_string(), granularity, tracker))
    }

    fn spawn(
        &self,
        product: String,
        granularity: Granularity,
        tracker: SharedTracker,
    ) -> PairSchedule {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let scheduler = self.clone();
        let period = granularity.period();
        let task_product = product.clone();

        let task = tokio::spawn(async move {
            // First firing one full period after seeding
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(
                "CandleScheduler: {} @ {} armed (every {:?})",
                task_product, granularity, period
            );

            loop {
                tokio::select! {
                    biased;

                    _ = stop_rx.changed() => break,

                    _ = interval.tick() => {
                        if let Err(e) = scheduler.tick(&tracker).await {
                            error!("CandleScheduler: {}", e);
                        }
                    }
                }
            }
        });

        PairSchedule {
            product,
            granularity,
            stop_tx,
            task,
        }
    }

    /// One period transition for a pair.
    ///
    /// The roll itself always commits; a failed indicator refresh is
    /// reported and leaves the previous indicators in place (flagged stale).
    pub(crate) async fn tick(&self, tracker: &SharedTracker) -> Result<Candle, TrackerError> {
        let mut guard = tracker.write().await;
        let product = guard.product().to_string();
        let granularity = guard.granularity();

        let closed = guard.roll();
        debug!(
            "CandleScheduler: {}: {} candle data: open={:.2}, close={:.2}, {:.2}% change, {} spread",
            product,
            granularity,
            closed.open,
            closed.close,
            closed.percent_change(),
            closed.high_low_spread()
        );

        let granularity_label = granularity.to_string();
        if let Some(metrics) = &self.metrics {
            let labels = [product.as_str(), granularity_label.as_str()];
            metrics.ticks_total.with_label_values(&labels).inc();
            metrics
                .stored_candles
                .with_label_values(&labels)
                .set(guard.store().len() as f64);
            metrics
                .last_close
                .with_label_values(&labels)
                .set(closed.close.to_f64().unwrap_or(0.0));
        }

        let refreshed = self
            .refresher
            .refresh(&mut guard, Some(granularity.period()))
            .await;

        if refreshed.is_err()
            && let Some(metrics) = &self.metrics
        {
            metrics
                .tick_failures_total
                .with_label_values(&[product.as_str(), granularity_label.as_str()])
                .inc();
        }

        refreshed.map(|_| closed)
    }
}
