//! Return transforms and sample moments for historical price series.
//!
//! This module includes:
//! - simple (percentage) returns `r_t = P_t / P_{t-1} - 1`,
//! - [`ReturnStatistics`], the mean and sample standard deviation of those returns,
//! - sample mean / standard deviation / interpolated quantile helpers shared with
//!   the path aggregator.
//!
//! Standard deviations use the unbiased `n - 1` divisor throughout.

use serde::{Deserialize, Serialize};

use crate::core::{PriceSeries, Result, SimulationError};

/// Mean and dispersion of daily simple returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatistics {
    /// Arithmetic mean of the daily returns.
    pub mean_return: f64,
    /// Sample standard deviation of the daily returns.
    pub std_return: f64,
    /// Number of returns the moments were estimated from (`prices - 1`).
    pub sample_size: usize,
}

impl ReturnStatistics {
    /// Computes return statistics from date-ordered prices.
    ///
    /// With exactly two prices there is a single return whose sample standard
    /// deviation is undefined; it is reported as `0.0`.
    ///
    /// # Errors
    /// - [`SimulationError::InsufficientData`] for fewer than 2 prices.
    /// - [`SimulationError::InvalidParameter`] for a non-finite or non-positive price.
    ///
    /// # Examples
    /// ```rust
    /// use stockpaths::math::timeseries::ReturnStatistics;
    ///
    /// let stats = ReturnStatistics::compute(&[100.0, 110.0, 99.0]).unwrap();
    /// assert!(stats.mean_return.abs() < 1.0e-12);
    /// assert_eq!(stats.sample_size, 2);
    /// ```
    pub fn compute(prices: &[f64]) -> Result<Self> {
        compute_labelled("<unnamed>", prices)
    }

    /// Computes return statistics for a loaded series, naming its ticker in errors.
    pub fn from_series(series: &PriceSeries) -> Result<Self> {
        compute_labelled(series.ticker(), &series.prices())
    }
}

fn compute_labelled(ticker: &str, prices: &[f64]) -> Result<ReturnStatistics> {
    if prices.len() < 2 {
        return Err(SimulationError::InsufficientData {
            ticker: ticker.to_string(),
            observations: prices.len(),
        });
    }
    if let Some(bad) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
        return Err(SimulationError::invalid(format!(
            "prices for `{ticker}` must be finite and > 0, got {bad}"
        )));
    }

    let returns = simple_returns(prices);
    let mean_return = mean(&returns);
    let std_return = sample_std_dev(&returns);

    tracing::debug!(
        ticker,
        returns = returns.len(),
        mean_return,
        std_return,
        "computed return statistics"
    );

    Ok(ReturnStatistics {
        mean_return,
        std_return,
        sample_size: returns.len(),
    })
}

/// Computes simple returns from a price series.
///
/// `r_t = P_t / P_{t-1} - 1`; an input of `n` prices yields `n - 1` returns and
/// fewer than two prices yields an empty vector.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with the `n - 1` divisor; `0.0` for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss = values.iter().map(|x| (x - m) * (x - m)).sum::<f64>();
    (ss / (values.len() as f64 - 1.0)).sqrt()
}

/// Linearly interpolated quantile of an ascending-sorted sample.
///
/// `p` is clamped to `[0, 1]`. Returns `NaN` for an empty sample.
pub fn sorted_quantile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 1.0) * (n as f64 - 1.0);
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            if lo == hi {
                sorted[lo]
            } else {
                let w = rank - lo as f64;
                sorted[lo] + w * (sorted[hi] - sorted[lo])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_have_one_fewer_element() {
        let r = simple_returns(&[50.0, 55.0, 52.5]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.10).abs() < 1.0e-12);
        assert!((r[1] + 0.045_454_545_454_545_456).abs() < 1.0e-12);
    }

    #[test]
    fn compute_rejects_short_series() {
        for prices in [&[][..], &[100.0][..]] {
            let err = ReturnStatistics::compute(prices).unwrap_err();
            assert!(matches!(
                err,
                SimulationError::InsufficientData { observations, .. } if observations == prices.len()
            ));
        }
    }

    #[test]
    fn compute_rejects_non_positive_prices() {
        let err = ReturnStatistics::compute(&[100.0, -5.0, 90.0]).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidParameter(_)));
    }

    #[test]
    fn single_return_has_zero_dispersion() {
        let stats = ReturnStatistics::compute(&[100.0, 104.0]).unwrap();
        assert!((stats.mean_return - 0.04).abs() < 1.0e-12);
        assert_eq!(stats.std_return, 0.0);
        assert_eq!(stats.sample_size, 1);
    }

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(sorted_quantile(&sorted, 0.0), 1.0);
        assert_eq!(sorted_quantile(&sorted, 0.5), 3.0);
        assert_eq!(sorted_quantile(&sorted, 1.0), 5.0);
        assert!((sorted_quantile(&sorted, 0.1) - 1.4).abs() < 1.0e-12);
        assert!(sorted_quantile(&[], 0.5).is_nan());
    }
}
