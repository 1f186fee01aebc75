//! TOML application configuration.
//!
//! Every field has a default, so a partial file (or no file at all) yields a
//! runnable configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{ForecastEngine, PathConvention};
use crate::market::loader::{
    CsvPriceLoader, DEFAULT_DATE_COLUMN, DEFAULT_DATE_FORMAT, DEFAULT_PRICE_COLUMN,
    DEFAULT_TICKER_COLUMN,
};
use crate::math::rng::RandomSource;
use crate::mc::PathSimulator;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

/// Location and layout of the price CSV.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    #[serde(default = "default_ticker_column")]
    pub ticker_column: String,
    #[serde(default = "default_date_column")]
    pub date_column: String,
    #[serde(default = "default_price_column")]
    pub price_column: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            ticker_column: default_ticker_column(),
            date_column: default_date_column(),
            price_column: default_price_column(),
            date_format: default_date_format(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("stock_prices.csv")
}

fn default_ticker_column() -> String {
    DEFAULT_TICKER_COLUMN.to_string()
}

fn default_date_column() -> String {
    DEFAULT_DATE_COLUMN.to_string()
}

fn default_price_column() -> String {
    DEFAULT_PRICE_COLUMN.to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl DataConfig {
    pub fn loader(&self) -> CsvPriceLoader {
        CsvPriceLoader::new(&self.path)
            .with_columns(&self.ticker_column, &self.date_column, &self.price_column)
            .with_date_format(&self.date_format)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Base seed; unset means a fresh seed per request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub convention: PathConvention,
    /// Upper bound on paths x days for one request.
    #[serde(default = "default_max_cells")]
    pub max_cells: usize,
    /// Include per-day dispersion and percentiles in reports.
    #[serde(default)]
    pub summary: bool,
    /// Directory for path-matrix CSV artifacts; unset or empty disables them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            convention: PathConvention::default(),
            max_cells: default_max_cells(),
            summary: false,
            artifacts_dir: None,
        }
    }
}

fn default_max_cells() -> usize {
    50_000_000
}

impl SimulationConfig {
    pub fn simulator(&self) -> PathSimulator {
        PathSimulator::new()
            .with_random_source(RandomSource::from(self.seed))
            .with_convention(self.convention)
            .with_max_cells(self.max_cells)
    }

    pub fn engine(&self) -> ForecastEngine {
        ForecastEngine::new(self.simulator()).with_summary(self.summary)
    }

    /// Configured artifact directory, treating an empty path as unset.
    pub fn artifacts_dir(&self) -> Option<&Path> {
        self.artifacts_dir
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
