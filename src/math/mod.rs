//! Numerical helpers: return statistics, sample moments and random streams.

pub mod rng;
pub mod timeseries;

pub use rng::{RandomSource, stream_rng, stream_seed};
pub use timeseries::{ReturnStatistics, mean, sample_std_dev, simple_returns, sorted_quantile};
