pub mod candle;
pub mod granularity;
pub mod historic_rate;
pub mod indicators;

pub use candle::Candle;
pub use granularity::Granularity;
pub use historic_rate::HistoricRate;
pub use indicators::{IndicatorSet, MacdReading};
