//! Forecast pipeline: price history in, per-day expected prices out.
//!
//! [`ForecastEngine`] chains [`crate::math::ReturnStatistics`], [`PathSimulator`] and the
//! cross-path reductions in [`crate::mc::aggregate`] behind one call.

use chrono::NaiveDate;

use super::serialization::SimulationReport;
use super::{PathConvention, PriceSeries, Result, SimulationRequest};
use crate::mc::{DailyAggregate, DailySummary, PathMatrix, PathSimulator, aggregate, summarize};

/// Runs statistics, simulation and aggregation for one ticker.
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    pub simulator: PathSimulator,
    /// Also compute [`DailySummary`] rows for each day.
    pub summary: bool,
}

/// Everything produced by one [`ForecastEngine::forecast`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub request: SimulationRequest,
    pub matrix: PathMatrix,
    pub daily: DailyAggregate,
    pub summary: Option<Vec<DailySummary>>,
    /// Base seed the paths were drawn from; replaying it reproduces `matrix`.
    pub seed: u64,
    pub convention: PathConvention,
    as_of: Option<NaiveDate>,
}

impl ForecastEngine {
    pub fn new(simulator: PathSimulator) -> Self {
        Self {
            simulator,
            summary: false,
        }
    }

    pub fn with_summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }

    /// Forecasts `horizon_days` of prices for `series` from `path_count` paths.
    ///
    /// The starting price is the last observation; return statistics are taken
    /// over the full series.
    ///
    /// # Errors
    /// Propagates [`super::SimulationError::InsufficientData`] from the statistics
    /// step and [`super::SimulationError::InvalidParameter`] from validation.
    ///
    /// # Examples
    /// ```rust
    /// use chrono::NaiveDate;
    /// use stockpaths::core::{ForecastEngine, PriceObservation, PriceSeries};
    /// use stockpaths::mc::PathSimulator;
    ///
    /// let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
    /// let series = PriceSeries::new(
    ///     "PETR4",
    ///     vec![
    ///         PriceObservation::new(d(1), 50.0),
    ///         PriceObservation::new(d(4), 55.0),
    ///         PriceObservation::new(d(5), 52.5),
    ///     ],
    /// )
    /// .unwrap();
    ///
    /// let engine = ForecastEngine::new(PathSimulator::seeded(9));
    /// let forecast = engine.forecast(&series, 5, 200, None).unwrap();
    /// assert_eq!(forecast.daily.len(), 5);
    /// assert_eq!(forecast.daily[0].day, 1);
    /// ```
    pub fn forecast(
        &self,
        series: &PriceSeries,
        horizon_days: usize,
        path_count: usize,
        requester: Option<&str>,
    ) -> Result<Forecast> {
        let span = tracing::info_span!(
            "forecast",
            ticker = series.ticker(),
            days = horizon_days,
            paths = path_count
        );
        let _guard = span.enter();

        let mut request = SimulationRequest::from_series(series, horizon_days, path_count)?;
        if let Some(requester) = requester {
            request = request.with_requester(requester);
        }
        let mut forecast = self.run(request)?;
        forecast.as_of = series.last_date();
        Ok(forecast)
    }

    /// Runs a prepared request.
    ///
    /// The base seed is resolved here, so entropy-backed runs still report the
    /// seed that reproduces them.
    pub fn run(&self, request: SimulationRequest) -> Result<Forecast> {
        let params = request.parameters()?;
        let seed = self.simulator.random_source.base_seed();
        let matrix = self.simulator.simulate_from_seed(&params, seed)?;
        let daily = aggregate(&matrix)?;
        let summary = if self.summary {
            Some(summarize(&matrix)?)
        } else {
            None
        };

        tracing::info!(
            ticker = %request.ticker,
            start = request.starting_price,
            mean_return = request.statistics.mean_return,
            std_return = request.statistics.std_return,
            seed,
            "forecast complete"
        );

        Ok(Forecast {
            request,
            matrix,
            daily,
            summary,
            seed,
            convention: self.simulator.convention,
            as_of: None,
        })
    }
}

impl Forecast {
    /// Date of the last historical observation, when the forecast came from a series.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    /// Structured report for this forecast; the path matrix is not included.
    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            ticker: self.request.ticker.clone(),
            requester: self.request.requester.clone(),
            as_of: self.as_of,
            starting_price: self.request.starting_price,
            horizon_days: self.request.horizon_days,
            path_count: self.request.path_count,
            mean_return: self.request.statistics.mean_return,
            std_return: self.request.statistics.std_return,
            convention: self.convention,
            seed: self.seed,
            daily: self.daily.clone(),
            summary: self.summary.clone(),
        }
    }
}
