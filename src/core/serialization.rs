//! Output payloads for a finished forecast.
//!
//! A forecast can be presented as plain `"Day N: <mean>"` lines or as a
//! structured [`SimulationReport`]; the full path matrix can additionally be
//! persisted as a CSV artifact.
//!
//! # Examples
//! ```rust
//! use stockpaths::core::{from_json, render_daily_lines, to_json_pretty, SimulationReport};
//! use stockpaths::mc::DailyMean;
//!
//! let daily = vec![
//!     DailyMean { day: 1, mean_price: 10.5 },
//!     DailyMean { day: 2, mean_price: 11.0 },
//! ];
//! assert_eq!(render_daily_lines(&daily), vec!["Day 1: 10.5", "Day 2: 11.0"]);
//!
//! let report = SimulationReport {
//!     ticker: "BBAS3".to_string(),
//!     requester: None,
//!     as_of: None,
//!     starting_price: 10.0,
//!     horizon_days: 2,
//!     path_count: 100,
//!     mean_return: 0.01,
//!     std_return: 0.02,
//!     convention: Default::default(),
//!     seed: 7,
//!     daily,
//!     summary: None,
//! };
//! let json = to_json_pretty(&report).expect("json serialization");
//! let decoded: SimulationReport = from_json(&json).expect("json deserialization");
//! assert_eq!(decoded, report);
//! ```

use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{PathConvention, Result, SimulationError};
use crate::mc::{DailyMean, DailySummary, PathMatrix};

/// Structured result of one forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub ticker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
    /// Date of the last historical observation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    pub starting_price: f64,
    pub horizon_days: usize,
    pub path_count: usize,
    pub mean_return: f64,
    pub std_return: f64,
    pub convention: PathConvention,
    /// Base seed; a simulator seeded with it reproduces the run.
    pub seed: u64,
    pub daily: Vec<DailyMean>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<DailySummary>>,
}

impl SimulationReport {
    /// `"Day N: <mean>"` lines for this report.
    pub fn lines(&self) -> Vec<String> {
        render_daily_lines(&self.daily)
    }
}

/// Renders one `"Day N: <mean>"` line per entry, in order.
///
/// Means print in shortest round-trip form and always carry a decimal point
/// (`11.0`, not `11`).
pub fn render_daily_lines(daily: &[DailyMean]) -> Vec<String> {
    daily
        .iter()
        .map(|e| format!("Day {}: {:?}", e.day, e.mean_price))
        .collect()
}

/// Serialize a value to pretty JSON.
pub fn to_json_pretty<T: Serialize>(value: &T) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Deserialize a value from JSON.
pub fn from_json<T: DeserializeOwned>(payload: &str) -> std::result::Result<T, serde_json::Error> {
    serde_json::from_str(payload)
}

/// File name for a path-matrix artifact.
///
/// Characters outside `[A-Za-z0-9@._-]` in the requester and ticker are replaced
/// with `_`.
pub fn artifact_file_name(requester: &str, ticker: &str, paths: usize, days: usize) -> String {
    format!(
        "monte_carlo_{}_{}_{paths}_{days}.csv",
        sanitize(requester),
        sanitize(ticker)
    )
}

fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Writes the path matrix as CSV: a `path` column followed by `day_1..day_H`.
///
/// # Errors
/// Returns [`SimulationError::Artifact`] when the file cannot be created or written.
pub fn write_paths_csv<P: AsRef<Path>>(path: P, matrix: &PathMatrix) -> Result<()> {
    let path = path.as_ref();
    let artifact_err =
        |e: csv::Error| SimulationError::Artifact(format!("{}: {e}", path.display()));

    let mut writer = csv::Writer::from_path(path).map_err(artifact_err)?;

    let header = std::iter::once("path".to_string())
        .chain((1..=matrix.horizon_days()).map(|d| format!("day_{d}")));
    writer.write_record(header).map_err(artifact_err)?;

    for (i, row) in matrix.rows().enumerate() {
        let record = std::iter::once((i + 1).to_string()).chain(row.iter().map(f64::to_string));
        writer.write_record(record).map_err(artifact_err)?;
    }

    writer
        .flush()
        .map_err(|e| SimulationError::Artifact(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), paths = matrix.path_count(), "wrote path artifact");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_name_is_filesystem_safe() {
        assert_eq!(
            artifact_file_name("ana silva@example.com", "PETR4", 1000, 30),
            "monte_carlo_ana_silva@example.com_PETR4_1000_30.csv"
        );
        assert_eq!(
            artifact_file_name("../etc", "A/B", 1, 1),
            "monte_carlo_.._etc_A_B_1_1.csv"
        );
    }

    #[test]
    fn daily_lines_keep_a_decimal_point() {
        let daily = [
            DailyMean { day: 1, mean_price: 11.0 },
            DailyMean { day: 2, mean_price: 53.93 },
            DailyMean { day: 3, mean_price: -4.0 },
        ];
        assert_eq!(
            render_daily_lines(&daily),
            vec!["Day 1: 11.0", "Day 2: 53.93", "Day 3: -4.0"]
        );
    }

    #[test]
    fn paths_csv_has_header_and_one_row_per_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = dir.path().join("paths.csv");
        let m = PathMatrix::from_rows(vec![vec![1.5, 2.5], vec![3.0, 4.0]]).unwrap();
        write_paths_csv(&file, &m).unwrap();

        let content = std::fs::read_to_string(&file).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["path,day_1,day_2", "1,1.5,2.5", "2,3,4"]);
    }

    #[test]
    fn missing_directory_is_an_artifact_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = dir.path().join("missing").join("paths.csv");
        let m = PathMatrix::from_rows(vec![vec![1.0]]).unwrap();
        assert!(matches!(
            write_paths_csv(&file, &m),
            Err(SimulationError::Artifact(_))
        ));
    }
}
