//! Monte Carlo path generation and cross-path aggregation.

pub mod aggregate;
pub mod simulation;

pub use aggregate::{DailyAggregate, DailyMean, DailySummary, aggregate, summarize};
pub use simulation::{PathMatrix, PathSimulator};
