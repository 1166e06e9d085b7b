pub mod core;
pub mod exchange;
pub mod indicators;
pub mod mock;
pub mod observability;
