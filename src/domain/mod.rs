// Exchange account balances
pub mod account;

// Candles, granularities and indicator values
pub mod market;

// Port interfaces
pub mod ports;

// Per-pair candle tracking state
pub mod tracking;

// Domain-specific error types
pub mod errors;
