//! HTTP surface for forecasts.
//!
//! - `GET /stockprices/monte-carlo?ticker=..&days=..&paths=..[&requester=..][&format=lines]`
//! - `GET /health`
//!
//! Loading and simulation are CPU and file bound, so each request runs them on
//! the blocking pool.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::core::{
    ForecastEngine, SimulationError, SimulationReport, artifact_file_name, write_paths_csv,
};
use crate::market::PriceLoader;

/// Requester label used when the query omits one.
pub const DEFAULT_REQUESTER: &str = "default";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    loader: Arc<dyn PriceLoader>,
    engine: Arc<ForecastEngine>,
    artifacts_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(loader: Arc<dyn PriceLoader>, engine: ForecastEngine) -> Self {
        Self {
            loader,
            engine: Arc::new(engine),
            artifacts_dir: None,
        }
    }

    /// Writes each request's path matrix as CSV under `dir`.
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let state = Self::new(Arc::new(config.data.loader()), config.simulation.engine());
        match config.simulation.artifacts_dir() {
            Some(dir) => state.with_artifacts_dir(dir),
            None => state,
        }
    }

    fn run(
        &self,
        ticker: &str,
        days: usize,
        paths: usize,
        requester: &str,
    ) -> Result<SimulationReport, SimulationError> {
        let series = self.loader.load(ticker)?;
        let forecast = self.engine.forecast(&series, days, paths, Some(requester))?;
        if let Some(dir) = &self.artifacts_dir {
            let file = dir.join(artifact_file_name(requester, ticker, paths, days));
            write_paths_csv(&file, &forecast.matrix)?;
        }
        Ok(forecast.report())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured [`SimulationReport`].
    #[default]
    Report,
    /// JSON array of `"Day N: <mean>"` strings.
    Lines,
}

/// Query string of the forecast endpoint. Legacy parameter names are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct MonteCarloQuery {
    #[serde(alias = "ticker_simulacao")]
    pub ticker: String,
    #[serde(alias = "dias_sim")]
    pub days: usize,
    #[serde(alias = "num_sim")]
    pub paths: usize,
    #[serde(default, alias = "email_solicitante")]
    pub requester: Option<String>,
    #[serde(default)]
    pub format: OutputFormat,
}

/// Error response: `{"error": <kind>, "message": <text>}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    /// Missing or malformed query-string parameters.
    #[error("invalid query: {0}")]
    Query(String),
    #[error("worker task failed: {0}")]
    Worker(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Simulation(SimulationError::DataNotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Simulation(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Query(_) => StatusCode::BAD_REQUEST,
            Self::Simulation(_) | Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Simulation(e) => e.kind(),
            Self::Query(_) => "invalid_query",
            Self::Worker(_) => "internal",
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Query(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        let body = json!({ "error": self.kind(), "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub async fn monte_carlo(
    State(state): State<AppState>,
    query: Result<Query<MonteCarloQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let MonteCarloQuery {
        ticker,
        days,
        paths,
        requester,
        format,
    } = query;
    let requester = requester
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_REQUESTER.to_string());

    let report = tokio::task::spawn_blocking(move || state.run(&ticker, days, paths, &requester))
        .await
        .map_err(|e| ApiError::Worker(e.to_string()))??;

    Ok(match format {
        OutputFormat::Report => Json(report).into_response(),
        OutputFormat::Lines => Json(report.lines()).into_response(),
    })
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/stockprices/monte-carlo", get(monte_carlo))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
