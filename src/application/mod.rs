// Indicator recomputation over a tracker's closing series
pub mod indicator_refresher;

// Per-pair period timers
pub mod scheduler;

// Startup history bootstrap
pub mod seeder;

// Service wiring and lifecycle
pub mod system;
