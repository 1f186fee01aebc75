//! Cross-path reductions of a [`PathMatrix`], one entry per simulated day.

use serde::{Deserialize, Serialize};

use super::simulation::PathMatrix;
use crate::core::{Result, SimulationError};
use crate::math::timeseries::sorted_quantile;

/// Average simulated price on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyMean {
    /// 1-based day index.
    pub day: usize,
    pub mean_price: f64,
}

/// Day-ordered sequence of cross-path means.
pub type DailyAggregate = Vec<DailyMean>;

/// Distribution of simulated prices on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// 1-based day index.
    pub day: usize,
    pub mean: f64,
    /// Sample standard deviation across paths (`0.0` for a single path).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// 5th percentile.
    pub p05: f64,
    /// Median.
    pub p50: f64,
    /// 95th percentile.
    pub p95: f64,
}

/// Arithmetic mean of every day column, in day order.
///
/// # Errors
/// Returns [`SimulationError::EmptyMatrix`] when the matrix has no paths or no days.
///
/// # Examples
/// ```rust
/// use stockpaths::mc::{PathMatrix, aggregate};
///
/// let m = PathMatrix::from_rows(vec![vec![10.0, 20.0], vec![30.0, 40.0]]).unwrap();
/// let daily = aggregate(&m).unwrap();
/// assert_eq!(daily[0].mean_price, 20.0);
/// assert_eq!(daily[1].mean_price, 30.0);
/// ```
pub fn aggregate(matrix: &PathMatrix) -> Result<DailyAggregate> {
    if matrix.is_empty() {
        return Err(SimulationError::EmptyMatrix);
    }

    let mut sums = vec![0.0_f64; matrix.horizon_days()];
    for row in matrix.rows() {
        for (sum, price) in sums.iter_mut().zip(row) {
            *sum += price;
        }
    }

    let n = matrix.path_count() as f64;
    Ok(sums
        .into_iter()
        .enumerate()
        .map(|(d, sum)| DailyMean {
            day: d + 1,
            mean_price: sum / n,
        })
        .collect())
}

/// Per-day mean, dispersion, range and percentiles across paths.
///
/// # Errors
/// Returns [`SimulationError::EmptyMatrix`] when the matrix has no paths or no days.
pub fn summarize(matrix: &PathMatrix) -> Result<Vec<DailySummary>> {
    if matrix.is_empty() {
        return Err(SimulationError::EmptyMatrix);
    }

    let n = matrix.path_count() as f64;
    let mut column = Vec::with_capacity(matrix.path_count());
    let summaries = (0..matrix.horizon_days())
        .map(|d| {
            column.clear();
            column.extend(matrix.column(d));
            column.sort_by(|a, b| a.total_cmp(b));

            let mean = column.iter().sum::<f64>() / n;
            let std_dev = if column.len() > 1 {
                let ss = column.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>();
                (ss / (n - 1.0)).sqrt()
            } else {
                0.0
            };

            DailySummary {
                day: d + 1,
                mean,
                std_dev,
                min: column[0],
                max: column[column.len() - 1],
                p05: sorted_quantile(&column, 0.05),
                p50: sorted_quantile(&column, 0.50),
                p95: sorted_quantile(&column, 0.95),
            }
        })
        .collect();

    Ok(summaries)
}
