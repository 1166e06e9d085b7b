use crate::domain::errors::TrackerError;
use crate::domain::ports::IndicatorService;
use crate::domain::tracking::Tracker;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Recomputes a tracker's indicators from its full closing series.
///
/// No state is kept between calls: every refresh is a full recompute.
pub struct IndicatorRefresher {
    service: Arc<dyn IndicatorService>,
}

impl IndicatorRefresher {
    pub fn new(service: Arc<dyn IndicatorService>) -> Self {
        Self { service }
    }

    /// Refresh `tracker` in place.
    ///
    /// With a `budget`, a computation that runs longer fails. On failure the
    /// previous indicators are kept and flagged stale.
    pub async fn refresh(
        &self,
        tracker: &mut Tracker,
        budget: Option<Duration>,
    ) -> Result<(), TrackerError> {
        let closes: Vec<f64> = tracker
            .closing_series()
            .iter()
            .map(|c| c.to_f64().unwrap_or(0.0))
            .collect();

        let product = tracker.product().to_string();
        let granularity = tracker.granularity();
        let computation = self.service.compute(&product, granularity, &closes);

        let outcome = match budget {
            Some(limit) => match tokio::time::timeout(limit, computation).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!(
                    "indicator computation exceeded {:?}",
                    limit
                )),
            },
            None => computation.await,
        };

        match outcome {
            Ok(indicators) => {
                debug!(
                    "IndicatorRefresher: {} @ {} recomputed over {} closes",
                    product,
                    granularity,
                    closes.len()
                );
                tracker.apply_indicators(indicators);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "IndicatorRefresher: {} @ {} keeping previous indicators: {}",
                    product, granularity, e
                );
                tracker.mark_indicators_stale();
                Err(TrackerError::TickComputation {
                    product,
                    granularity,
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{Candle, Granularity, IndicatorSet};
    use crate::domain::tracking::CandleStore;
    use anyhow::Result;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::num::NonZeroUsize;
    use std::sync::Mutex;

    /// Records the series it was called with and echoes its length back.
    struct RecordingIndicators {
        calls: Mutex<Vec<Vec<f64>>>,
        fail: bool,
        delay: Option<Duration>,
    }

    impl RecordingIndicators {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: false,
                delay: None,
            }
        }
    }

    #[async_trait]
    impl IndicatorService for RecordingIndicators {
        async fn compute(
            &self,
            _product: &str,
            _granularity: Granularity,
            closes: &[f64],
        ) -> Result<IndicatorSet> {
            self.calls.lock().unwrap().push(closes.to_vec());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                anyhow::bail!("library error");
            }
            Ok(IndicatorSet {
                sample_size: closes.len(),
                ..IndicatorSet::default()
            })
        }
    }

    fn tracker(prices: &[Decimal]) -> Tracker {
        let store = CandleStore::with_history(
            NonZeroUsize::new(10).unwrap(),
            prices.iter().map(|p| Candle::flat(*p)),
        );
        Tracker::seeded("BTC-USD", Granularity::ONE_MINUTE, store).unwrap()
    }

    #[tokio::test]
    async fn test_refresh_passes_oldest_to_newest_closes() {
        let service = Arc::new(RecordingIndicators::new());
        let refresher = IndicatorRefresher::new(service.clone());
        let mut t = tracker(&[dec!(5), dec!(10), dec!(7.5)]);

        refresher.refresh(&mut t, None).await.unwrap();

        assert_eq!(service.calls.lock().unwrap()[0], vec![5.0, 10.0, 7.5]);
        assert_eq!(t.indicators().sample_size, 3);
        assert!(!t.indicators_stale());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_indicators() {
        let mut t = tracker(&[dec!(1), dec!(2)]);
        let ok = IndicatorRefresher::new(Arc::new(RecordingIndicators::new()));
        ok.refresh(&mut t, None).await.unwrap();
        let previous = t.indicators().clone();

        let failing = IndicatorRefresher::new(Arc::new(RecordingIndicators {
            fail: true,
            ..RecordingIndicators::new()
        }));
        t.roll();
        let err = failing.refresh(&mut t, None).await.unwrap_err();

        assert!(matches!(err, TrackerError::TickComputation { .. }));
        assert_eq!(t.indicators(), &previous);
        assert!(t.indicators_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exceeded_is_a_failure() {
        let slow = IndicatorRefresher::new(Arc::new(RecordingIndicators {
            delay: Some(Duration::from_secs(120)),
            ..RecordingIndicators::new()
        }));
        let mut t = tracker(&[dec!(1)]);

        let err = slow
            .refresh(&mut t, Some(Duration::from_secs(60)))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("exceeded"));
        assert!(t.indicators_stale());
    }
}
