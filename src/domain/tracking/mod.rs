pub mod candle_store;
pub mod live_candle;
pub mod registry;
pub mod tracker;

pub use candle_store::CandleStore;
pub use live_candle::LiveCandleAggregator;
pub use registry::PriceTrackerRegistry;
pub use tracker::{Tracker, TrackerSnapshot};
