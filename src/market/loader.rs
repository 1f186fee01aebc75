//! Price-history sources.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::core::{PriceObservation, PriceSeries, Result, SimulationError};

pub const DEFAULT_TICKER_COLUMN: &str = "Ticker";
pub const DEFAULT_DATE_COLUMN: &str = "Date";
pub const DEFAULT_PRICE_COLUMN: &str = "PrecoAcao";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of date-ordered closing prices for a ticker.
pub trait PriceLoader: std::fmt::Debug + Send + Sync {
    /// Loads the full history for `ticker`.
    ///
    /// # Errors
    /// [`SimulationError::DataNotFound`] when the source has no rows for the
    /// ticker, [`SimulationError::Load`] for I/O or parse failures.
    fn load(&self, ticker: &str) -> Result<PriceSeries>;
}

/// Reads a header-addressed CSV file holding rows for many tickers.
///
/// The file is re-read on every [`PriceLoader::load`] call, so edits to the
/// file are visible to the next request.
#[derive(Debug, Clone)]
pub struct CsvPriceLoader {
    path: PathBuf,
    ticker_column: String,
    date_column: String,
    price_column: String,
    date_format: String,
}

impl CsvPriceLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ticker_column: DEFAULT_TICKER_COLUMN.to_string(),
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            price_column: DEFAULT_PRICE_COLUMN.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Overrides the ticker, date and price header names.
    pub fn with_columns(
        mut self,
        ticker: impl Into<String>,
        date: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        self.ticker_column = ticker.into();
        self.date_column = date.into();
        self.price_column = price.into();
        self
    }

    /// `chrono` format string for the date column.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_err(&self, message: impl std::fmt::Display) -> SimulationError {
        SimulationError::Load(format!("{}: {message}", self.path.display()))
    }
}

impl PriceLoader for CsvPriceLoader {
    fn load(&self, ticker: &str) -> Result<PriceSeries> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.load_err(format_args!("failed to open CSV: {e}")))?;

        let headers = reader
            .headers()
            .map_err(|e| self.load_err(format_args!("failed to read headers: {e}")))?
            .clone();
        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                self.load_err(format_args!(
                    "missing column `{name}`, available: {:?}",
                    headers.iter().collect::<Vec<_>>()
                ))
            })
        };
        let ticker_idx = column(&self.ticker_column)?;
        let date_idx = column(&self.date_column)?;
        let price_idx = column(&self.price_column)?;

        let mut observations = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| self.load_err(format_args!("malformed row: {e}")))?;
            if record.get(ticker_idx) != Some(ticker) {
                continue;
            }
            let line = record.position().map_or(0, csv::Position::line);

            let raw_date = record.get(date_idx).unwrap_or_default();
            let date = NaiveDate::parse_from_str(raw_date, &self.date_format).map_err(|e| {
                self.load_err(format_args!("line {line}: bad date `{raw_date}`: {e}"))
            })?;
            let raw_price = record.get(price_idx).unwrap_or_default();
            let price = raw_price.parse::<f64>().map_err(|e| {
                self.load_err(format_args!("line {line}: bad price `{raw_price}`: {e}"))
            })?;

            observations.push(PriceObservation::new(date, price));
        }

        if observations.is_empty() {
            return Err(SimulationError::DataNotFound {
                ticker: ticker.to_string(),
            });
        }

        tracing::debug!(
            ticker,
            rows = observations.len(),
            path = %self.path.display(),
            "loaded price history"
        );
        PriceSeries::new(ticker, observations)
    }
}

/// Ticker-keyed histories held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceLoader {
    series: HashMap<String, Vec<PriceObservation>>,
}

impl InMemoryPriceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the history for `ticker`.
    pub fn with_series(
        mut self,
        ticker: impl Into<String>,
        observations: Vec<PriceObservation>,
    ) -> Self {
        self.insert(ticker, observations);
        self
    }

    pub fn insert(&mut self, ticker: impl Into<String>, observations: Vec<PriceObservation>) {
        self.series.insert(ticker.into(), observations);
    }
}

impl PriceLoader for InMemoryPriceLoader {
    fn load(&self, ticker: &str) -> Result<PriceSeries> {
        match self.series.get(ticker) {
            Some(obs) if !obs.is_empty() => PriceSeries::new(ticker, obs.clone()),
            _ => Err(SimulationError::DataNotFound {
                ticker: ticker.to_string(),
            }),
        }
    }
}
