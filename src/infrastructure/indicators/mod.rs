pub mod ta_indicators;

pub use ta_indicators::TaIndicatorService;
