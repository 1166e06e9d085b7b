//! Push-based observability
//!
//! Outbound data only, no HTTP server:
//!
//! 1. **Prometheus registry**: tick counters and per-pair gauges, rendered on demand
//! 2. **Structured JSON logs**: periodic per-pair snapshot on stdout

pub mod metrics;
pub mod reporter;

pub use metrics::Metrics;
pub use reporter::MetricsReporter;
