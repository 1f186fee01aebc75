use std::io::Write;

use approx::assert_relative_eq;
use stockpaths::config::AppConfig;
use stockpaths::core::{
    ForecastEngine, PathConvention, SimulationError, SimulationReport, from_json, to_json_pretty,
};
use stockpaths::market::{CsvPriceLoader, PriceLoader};
use stockpaths::mc::PathSimulator;
use tempfile::NamedTempFile;

fn price_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(
        file,
        "Ticker,Date,PrecoAcao\n\
         ABCD3,2024-03-05,52.5\n\
         WXYZ4,2024-03-01,9.0\n\
         ABCD3,2024-03-01,50.0\n\
         ABCD3,2024-03-04,55.0\n\
         WXYZ4,2024-03-04,9.5\n"
    )
    .expect("write csv");
    file
}

#[test]
fn day_one_mean_tracks_expected_drift() {
    let file = price_file();
    let series = CsvPriceLoader::new(file.path()).load("ABCD3").unwrap();
    assert_eq!(series.prices(), vec![50.0, 55.0, 52.5]);

    let paths = 1_000;
    let forecast = ForecastEngine::new(PathSimulator::seeded(2024))
        .forecast(&series, 5, paths, Some("ana@example.com"))
        .unwrap();

    let stats = forecast.request.statistics;
    assert_relative_eq!(stats.mean_return, 0.027_272_727_272_727_27, epsilon = 1.0e-12);
    assert_eq!(forecast.request.starting_price, 52.5);
    assert_eq!(forecast.daily.len(), 5);
    assert_eq!(forecast.matrix.path_count(), paths);

    // E[day 1] = S0 (1 + mu); five standard errors of the sample mean.
    let expected = 52.5 * (1.0 + stats.mean_return);
    let tolerance = 5.0 * 52.5 * stats.std_return / (paths as f64).sqrt();
    let day_one = forecast.daily[0].mean_price;
    assert!(
        (day_one - expected).abs() < tolerance,
        "day 1 mean {day_one} vs {expected} +/- {tolerance}"
    );
}

#[test]
fn anchored_convention_reproduces_starting_price_on_day_one() {
    let file = price_file();
    let series = CsvPriceLoader::new(file.path()).load("ABCD3").unwrap();
    let forecast = ForecastEngine::new(
        PathSimulator::seeded(1).with_convention(PathConvention::AnchoredStart),
    )
    .forecast(&series, 3, 10, None)
    .unwrap();
    assert_eq!(forecast.daily[0].mean_price, 52.5);
    assert_eq!(forecast.report().convention, PathConvention::AnchoredStart);
}

#[test]
fn report_serializes_and_renders_lines() {
    let file = price_file();
    let series = CsvPriceLoader::new(file.path()).load("WXYZ4").unwrap();
    let forecast = ForecastEngine::new(PathSimulator::seeded(8))
        .with_summary(true)
        .forecast(&series, 4, 50, None)
        .unwrap();

    let report = forecast.report();
    let json = to_json_pretty(&report).unwrap();
    let decoded: SimulationReport = from_json(&json).unwrap();
    assert_eq!(decoded, report);
    assert_eq!(decoded.as_of.map(|d| d.to_string()).as_deref(), Some("2024-03-04"));

    let lines = report.lines();
    assert_eq!(lines.len(), 4);
    for (i, line) in lines.iter().enumerate() {
        assert!(line.starts_with(&format!("Day {}: ", i + 1)), "{line}");
    }

    let summary = report.summary.expect("summary requested");
    for (s, d) in summary.iter().zip(&report.daily) {
        assert_relative_eq!(s.mean, d.mean_price, max_relative = 1.0e-12);
        assert!(s.min <= s.p05 && s.p05 <= s.p50 && s.p50 <= s.p95 && s.p95 <= s.max);
    }
}

#[test]
fn config_wires_loader_and_engine() {
    let file = price_file();
    let cfg = AppConfig::from_toml(&format!(
        "[data]\npath = {:?}\n\n[simulation]\nseed = 11\nmax_cells = 100\n",
        file.path().display().to_string()
    ))
    .unwrap();

    let series = cfg.data.loader().load("ABCD3").unwrap();
    let engine = cfg.simulation.engine();
    assert_eq!(engine.forecast(&series, 10, 10, None).unwrap().seed, 11);
    assert!(matches!(
        engine.forecast(&series, 10, 11, None),
        Err(SimulationError::InvalidParameter(_))
    ));
}

#[test]
fn single_observation_ticker_is_insufficient() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "Ticker,Date,PrecoAcao\nSOLO3,2024-01-02,12.0").expect("write csv");
    let series = CsvPriceLoader::new(file.path()).load("SOLO3").unwrap();
    let err = ForecastEngine::default()
        .forecast(&series, 5, 10, None)
        .unwrap_err();
    assert_eq!(
        err,
        SimulationError::InsufficientData {
            ticker: "SOLO3".to_string(),
            observations: 1
        }
    );
}
