use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Result, SimulationError};
use crate::math::timeseries::ReturnStatistics;

/// One closing price for one ticker on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub price: f64,
}

impl PriceObservation {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Date-ordered price history for a single ticker.
///
/// Construction validates every price and stable-sorts by date, so consumers
/// can rely on `prices()` being ascending in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    /// Validates and sorts a batch of observations.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidParameter`] when any price is
    /// non-finite or not strictly positive.
    pub fn new(
        ticker: impl Into<String>,
        mut observations: Vec<PriceObservation>,
    ) -> Result<Self> {
        let ticker = ticker.into();
        if let Some(bad) = observations
            .iter()
            .find(|o| !o.price.is_finite() || o.price <= 0.0)
        {
            return Err(SimulationError::invalid(format!(
                "price for `{ticker}` on {} must be finite and > 0, got {}",
                bad.date, bad.price
            )));
        }
        observations.sort_by_key(|o| o.date);
        Ok(Self {
            ticker,
            observations,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Prices in date order.
    pub fn prices(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.price).collect()
    }

    /// Most recent observation, used as the simulation starting price.
    pub fn last_price(&self) -> Option<f64> {
        self.observations.last().map(|o| o.price)
    }

    /// Date of the most recent observation.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }
}

/// Placement of the starting price relative to the simulated columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathConvention {
    /// Day 1 is the first randomly stepped price; one draw per simulated day.
    #[default]
    FirstDayStepped,
    /// Day 1 holds the unperturbed starting price; `horizon_days - 1` draws follow.
    AnchoredStart,
}

impl PathConvention {
    /// Number of random steps taken per path for a given horizon.
    #[inline]
    pub fn steps(self, horizon_days: usize) -> usize {
        match self {
            Self::FirstDayStepped => horizon_days,
            Self::AnchoredStart => horizon_days.saturating_sub(1),
        }
    }
}

/// Everything one simulation run needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub starting_price: f64,
    pub mean_return: f64,
    pub std_return: f64,
    pub horizon_days: usize,
    pub path_count: usize,
}

impl SimulationParameters {
    /// Starts a parameter builder.
    ///
    /// # Examples
    /// ```
    /// use stockpaths::core::SimulationParameters;
    ///
    /// let params = SimulationParameters::builder()
    ///     .starting_price(50.0)
    ///     .mean_return(0.001)
    ///     .std_return(0.02)
    ///     .horizon_days(10)
    ///     .path_count(100)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(params.horizon_days, 10);
    /// ```
    #[inline]
    pub fn builder() -> SimulationParametersBuilder {
        SimulationParametersBuilder::default()
    }

    /// Total number of matrix cells this run produces.
    #[inline]
    pub fn cells(&self) -> Option<usize> {
        self.path_count.checked_mul(self.horizon_days)
    }

    /// Checks the preconditions of [`crate::mc::PathSimulator::simulate`].
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidParameter`] for a horizon or path
    /// count below 1, a non-positive or non-finite starting price, a
    /// non-finite mean, or a negative or non-finite standard deviation.
    pub fn validate(&self) -> Result<()> {
        if self.horizon_days < 1 {
            return Err(SimulationError::invalid("horizon_days must be >= 1"));
        }
        if self.path_count < 1 {
            return Err(SimulationError::invalid("path_count must be >= 1"));
        }
        if !self.starting_price.is_finite() || self.starting_price <= 0.0 {
            return Err(SimulationError::invalid(format!(
                "starting_price must be finite and > 0, got {}",
                self.starting_price
            )));
        }
        if !self.mean_return.is_finite() {
            return Err(SimulationError::invalid(format!(
                "mean_return must be finite, got {}",
                self.mean_return
            )));
        }
        if !self.std_return.is_finite() || self.std_return < 0.0 {
            return Err(SimulationError::invalid(format!(
                "std_return must be finite and >= 0, got {}",
                self.std_return
            )));
        }
        Ok(())
    }
}

/// Builder for [`SimulationParameters`].
#[derive(Debug, Clone, Default)]
pub struct SimulationParametersBuilder {
    starting_price: Option<f64>,
    mean_return: Option<f64>,
    std_return: Option<f64>,
    horizon_days: Option<usize>,
    path_count: Option<usize>,
}

impl SimulationParametersBuilder {
    #[inline]
    pub fn starting_price(mut self, starting_price: f64) -> Self {
        self.starting_price = Some(starting_price);
        self
    }

    #[inline]
    pub fn mean_return(mut self, mean_return: f64) -> Self {
        self.mean_return = Some(mean_return);
        self
    }

    #[inline]
    pub fn std_return(mut self, std_return: f64) -> Self {
        self.std_return = Some(std_return);
        self
    }

    /// Sets mean and standard deviation from computed statistics.
    #[inline]
    pub fn statistics(mut self, stats: ReturnStatistics) -> Self {
        self.mean_return = Some(stats.mean_return);
        self.std_return = Some(stats.std_return);
        self
    }

    #[inline]
    pub fn horizon_days(mut self, horizon_days: usize) -> Self {
        self.horizon_days = Some(horizon_days);
        self
    }

    #[inline]
    pub fn path_count(mut self, path_count: usize) -> Self {
        self.path_count = Some(path_count);
        self
    }

    /// Validates and builds [`SimulationParameters`].
    ///
    /// Mean and standard deviation default to zero when unset.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidParameter`] when the starting price,
    /// horizon or path count is missing, or when validation fails.
    pub fn build(self) -> Result<SimulationParameters> {
        let starting_price = self
            .starting_price
            .ok_or_else(|| SimulationError::invalid("starting_price is required"))?;
        let horizon_days = self
            .horizon_days
            .ok_or_else(|| SimulationError::invalid("horizon_days is required"))?;
        let path_count = self
            .path_count
            .ok_or_else(|| SimulationError::invalid("path_count is required"))?;

        let params = SimulationParameters {
            starting_price,
            mean_return: self.mean_return.unwrap_or(0.0),
            std_return: self.std_return.unwrap_or(0.0),
            horizon_days,
            path_count,
        };
        params.validate()?;
        Ok(params)
    }
}

/// Caller-facing bundle: which ticker, how far, how many paths, and the
/// statistics the run will be driven by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub ticker: String,
    pub horizon_days: usize,
    pub path_count: usize,
    pub starting_price: f64,
    pub statistics: ReturnStatistics,
    /// Label for artifacts only; never read by the simulation.
    pub requester: Option<String>,
}

impl SimulationRequest {
    /// Derives a request from a price history: statistics from the full
    /// series, starting price from its last observation.
    ///
    /// # Errors
    /// Returns [`SimulationError::InsufficientData`] for fewer than two
    /// observations.
    pub fn from_series(series: &PriceSeries, horizon_days: usize, path_count: usize) -> Result<Self> {
        let statistics = ReturnStatistics::from_series(series)?;
        let starting_price = series
            .last_price()
            .ok_or_else(|| SimulationError::InsufficientData {
                ticker: series.ticker().to_string(),
                observations: 0,
            })?;
        Ok(Self {
            ticker: series.ticker().to_string(),
            horizon_days,
            path_count,
            starting_price,
            statistics,
            requester: None,
        })
    }

    pub fn with_requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = Some(requester.into());
        self
    }

    /// Converts to validated simulation parameters.
    pub fn parameters(&self) -> Result<SimulationParameters> {
        SimulationParameters::builder()
            .starting_price(self.starting_price)
            .statistics(self.statistics)
            .horizon_days(self.horizon_days)
            .path_count(self.path_count)
            .build()
    }
}
