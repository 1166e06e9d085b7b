//! REST adapters for the exchange: public candles and signed account access.

pub mod accounts;
pub mod auth;
pub mod market_data;

pub use accounts::ExchangeAccountService;
pub use auth::RequestSigner;
pub use market_data::ExchangeMarketDataService;
