//! Push-based metrics reporter
//!
//! Periodically outputs a snapshot of every tracked pair as structured JSON
//! to stdout.

use crate::domain::tracking::{PriceTrackerRegistry, TrackerSnapshot};
use crate::infrastructure::observability::metrics::Metrics;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub pairs: Vec<PairSnapshot>,
}

#[derive(Serialize)]
pub struct PairSnapshot {
    pub product: String,
    pub granularity_seconds: u32,
    pub stored_candles: usize,
    pub last_close: Option<Decimal>,
    pub ticks: u64,
    pub ema: BTreeMap<usize, Decimal>,
    pub rsi: Option<Decimal>,
    pub indicators_stale: bool,
}

impl From<&TrackerSnapshot> for PairSnapshot {
    fn from(snap: &TrackerSnapshot) -> Self {
        Self {
            product: snap.product.clone(),
            granularity_seconds: snap.granularity.seconds(),
            stored_candles: snap.candles.len(),
            last_close: snap.candles.last().map(|c| c.close),
            ticks: snap.ticks,
            ema: snap.indicators.ema.clone(),
            rsi: snap.indicators.rsi,
            indicators_stale: snap.indicators_stale,
        }
    }
}

/// Outputs tracker state as JSON logs on a fixed interval.
/// No HTTP server, no incoming connections.
pub struct MetricsReporter {
    registry: Arc<PriceTrackerRegistry>,
    metrics: Metrics,
    start_time: Instant,
    interval: Duration,
}

impl MetricsReporter {
    pub fn new(registry: Arc<PriceTrackerRegistry>, metrics: Metrics, interval_seconds: u64) -> Self {
        Self {
            registry,
            metrics,
            start_time: Instant::now(),
            interval: Duration::from_secs(interval_seconds),
        }
    }

    pub async fn run(self) {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            let snapshot = self.collect_snapshot().await;
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    // Prefixed so logs can be filtered
                    println!("METRICS_JSON:{}", json);
                    let stale = snapshot.pairs.iter().filter(|p| p.indicators_stale).count();
                    info!(
                        "Tracking {} pairs | {} with stale indicators | Uptime: {}s",
                        snapshot.pairs.len(),
                        stale,
                        snapshot.uptime_seconds
                    );
                }
                Err(e) => warn!("Failed to serialize metrics: {}", e),
            }
        }
    }

    async fn collect_snapshot(&self) -> MetricsSnapshot {
        let uptime = self.start_time.elapsed().as_secs();
        let pairs: Vec<PairSnapshot> = self
            .registry
            .snapshots()
            .await
            .iter()
            .map(PairSnapshot::from)
            .collect();

        self.metrics.tracked_pairs.set(pairs.len() as f64);
        self.metrics.uptime_seconds.set(uptime as f64);

        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            pairs,
        }
    }
}
