//! `stockpaths` forecasts stock prices by Monte Carlo simulation of a geometric
//! random walk calibrated on a ticker's historical daily returns.
//!
//! Pipeline:
//! 1. [`math::ReturnStatistics`] estimates the mean and sample standard deviation
//!    of simple daily returns from a [`core::PriceSeries`].
//! 2. [`mc::PathSimulator`] draws `path_count` independent paths of
//!    `horizon_days` prices, each day multiplying the previous price by `1 + r`
//!    with `r ~ N(mean, std)`.
//! 3. [`mc::aggregate`] reduces the resulting [`mc::PathMatrix`] to one mean
//!    price per simulated day; [`mc::summarize`] adds dispersion and percentiles.
//!
//! [`core::ForecastEngine`] chains the three steps. Price histories come from a
//! [`market::PriceLoader`]; the `server` feature exposes forecasts over HTTP.
//!
//! Numerical considerations:
//! - The walk is not floored at zero; draws below `-1` flip the sign of a path.
//! - Seeded runs are bit-identical with or without the `parallel` feature because
//!   every path owns its random stream.
//!
//! # Feature Flags
//! - `parallel`: fills paths concurrently with Rayon.
//! - `server`: axum HTTP service and the `stockpaths` binary.
//!
//! # Quick Start
//! Estimate return statistics:
//! ```rust
//! use stockpaths::math::ReturnStatistics;
//!
//! let stats = ReturnStatistics::compute(&[100.0, 110.0, 99.0]).unwrap();
//! assert!(stats.mean_return.abs() < 1.0e-12);
//! assert!((stats.std_return - 0.02_f64.sqrt()).abs() < 1.0e-12);
//! ```
//!
//! Simulate and aggregate:
//! ```rust
//! use stockpaths::core::SimulationParameters;
//! use stockpaths::mc::{PathSimulator, aggregate};
//!
//! let params = SimulationParameters::builder()
//!     .starting_price(52.5)
//!     .mean_return(0.0)
//!     .std_return(0.0)
//!     .horizon_days(3)
//!     .path_count(10)
//!     .build()
//!     .unwrap();
//! let matrix = PathSimulator::seeded(1).simulate(&params).unwrap();
//! let daily = aggregate(&matrix).unwrap();
//! assert!(daily.iter().all(|d| (d.mean_price - 52.5).abs() < 1.0e-12));
//! ```

pub mod config;
pub mod core;
pub mod market;
pub mod math;
pub mod mc;
#[cfg(feature = "server")]
pub mod server;

pub mod prelude {
    pub use crate::core::{
        Forecast, ForecastEngine, PathConvention, PriceObservation, PriceSeries, Result,
        SimulationError, SimulationParameters, SimulationReport, SimulationRequest,
    };
    pub use crate::market::{CsvPriceLoader, InMemoryPriceLoader, PriceLoader};
    pub use crate::math::{RandomSource, ReturnStatistics};
    pub use crate::mc::{DailyMean, DailySummary, PathMatrix, PathSimulator, aggregate, summarize};
}
