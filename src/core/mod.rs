//! Core domain types, the forecast pipeline, and the library-wide error type.

pub mod engine;
pub mod serialization;
pub mod types;

pub use engine::{Forecast, ForecastEngine};
pub use serialization::{
    SimulationReport, artifact_file_name, from_json, render_daily_lines, to_json_pretty,
    write_paths_csv,
};
pub use types::*;

/// Library-wide result alias.
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors surfaced by statistics, simulation, aggregation and loading.
///
/// Every error is terminal for the request that produced it; nothing is
/// retried inside the crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    /// Fewer than two price observations were available.
    #[error("insufficient data for `{ticker}`: {observations} observation(s), at least 2 required")]
    InsufficientData { ticker: String, observations: usize },

    /// Input validation error.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Aggregation was asked to reduce a matrix with no rows or no columns.
    #[error("path matrix is empty")]
    EmptyMatrix,

    /// The loader has no rows for the ticker.
    #[error("no price data found for ticker `{ticker}`")]
    DataNotFound { ticker: String },

    /// I/O or parse failure inside a loader.
    #[error("failed to load price data: {0}")]
    Load(String),

    /// Failure writing a simulation artifact.
    #[error("failed to write artifact: {0}")]
    Artifact(String),
}

impl SimulationError {
    /// Short machine-readable kind, used as the `error` field of HTTP bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "insufficient_data",
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::EmptyMatrix => "empty_matrix",
            Self::DataNotFound { .. } => "data_not_found",
            Self::Load(_) => "load_failed",
            Self::Artifact(_) => "artifact_failed",
        }
    }

    /// True when the error rejects the caller's request rather than signalling
    /// an internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. } | Self::InvalidParameter(_) | Self::DataNotFound { .. }
        )
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_classified() {
        assert!(SimulationError::invalid("x").is_client_error());
        assert!(
            SimulationError::DataNotFound {
                ticker: "ABC".to_string()
            }
            .is_client_error()
        );
        assert!(!SimulationError::EmptyMatrix.is_client_error());
        assert!(!SimulationError::Load("disk".to_string()).is_client_error());
    }

    #[test]
    fn display_names_the_ticker() {
        let err = SimulationError::InsufficientData {
            ticker: "PETR4".to_string(),
            observations: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("PETR4"), "{msg}");
        assert!(msg.contains("1 observation"), "{msg}");
        assert_eq!(err.kind(), "insufficient_data");
    }
}
