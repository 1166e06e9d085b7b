//! Prometheus metrics definitions for the candle tracker
//!
//! All metrics use the `candle_tracker_` prefix and are labelled by
//! `product` and `granularity`.

use prometheus::{
    CounterVec, Gauge, GaugeVec, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge, GenericGaugeVec},
};
use std::sync::Arc;

const PAIR_LABELS: &[&str] = &["product", "granularity"];

#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Completed candle periods
    pub ticks_total: CounterVec,
    /// Ticks whose indicator refresh failed
    pub tick_failures_total: CounterVec,
    /// Candles currently held in each store
    pub stored_candles: GenericGaugeVec<AtomicF64>,
    /// Close of the most recently closed candle
    pub last_close: GenericGaugeVec<AtomicF64>,
    /// Number of tracked pairs
    pub tracked_pairs: GenericGauge<AtomicF64>,
    /// Uptime in seconds
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let ticks_total = CounterVec::new(
            Opts::new(
                "candle_tracker_ticks_total",
                "Completed candle periods per pair",
            ),
            PAIR_LABELS,
        )?;
        registry.register(Box::new(ticks_total.clone()))?;

        let tick_failures_total = CounterVec::new(
            Opts::new(
                "candle_tracker_tick_failures_total",
                "Ticks whose indicator refresh failed",
            ),
            PAIR_LABELS,
        )?;
        registry.register(Box::new(tick_failures_total.clone()))?;

        let stored_candles = GaugeVec::new(
            Opts::new(
                "candle_tracker_stored_candles",
                "Closed candles held per pair",
            ),
            PAIR_LABELS,
        )?;
        registry.register(Box::new(stored_candles.clone()))?;

        let last_close = GaugeVec::new(
            Opts::new(
                "candle_tracker_last_close",
                "Close of the most recently closed candle",
            ),
            PAIR_LABELS,
        )?;
        registry.register(Box::new(last_close.clone()))?;

        let tracked_pairs = Gauge::with_opts(Opts::new(
            "candle_tracker_tracked_pairs",
            "Number of (product, granularity) pairs tracked",
        ))?;
        registry.register(Box::new(tracked_pairs.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "candle_tracker_uptime_seconds",
            "Process uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            ticks_total,
            tick_failures_total,
            stored_candles,
            last_close,
            tracked_pairs,
            uptime_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }
}
