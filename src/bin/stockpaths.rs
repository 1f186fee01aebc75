//! Command-line entry point: serve forecasts over HTTP or run one from the shell.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stockpaths::config::AppConfig;
use stockpaths::core::{artifact_file_name, to_json_pretty, write_paths_csv};
use stockpaths::market::PriceLoader;
use stockpaths::server::{self, AppState, DEFAULT_REQUESTER};

type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "stockpaths", version, about = "Monte Carlo stock price forecasts")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "stockpaths.toml", env = "STOCKPATHS_CONFIG")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output format (pretty, json, compact)
    #[arg(long)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Override the bind address from config
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run one forecast and print the result
    Simulate {
        #[arg(long)]
        ticker: String,
        #[arg(long)]
        days: usize,
        #[arg(long)]
        paths: usize,
        #[arg(long)]
        requester: Option<String>,
        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,
        /// Print the full report as JSON instead of one line per day
        #[arg(long)]
        json: bool,
    },
    /// Write the default configuration to a file
    SampleConfig { path: PathBuf },
}

fn setup_logging(config: &AppConfig, cli: &Cli) -> AppResult<()> {
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?
            .add_directive("hyper=warn".parse()?)
            .add_directive("tower_http=info".parse()?),
    };

    let format = cli
        .log_format
        .as_deref()
        .unwrap_or(config.logging.format.as_str());

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        "json" => builder.json().try_init()?,
        "compact" => builder.compact().try_init()?,
        _ => builder.with_target(false).try_init()?,
    }
    Ok(())
}

fn sample_config(path: &Path) -> AppResult<()> {
    let content = AppConfig::default().to_toml()?;
    let with_header = format!(
        "# stockpaths configuration\n# See: stockpaths --help\n\n{content}\n\
         # [simulation]\n# seed = 42\n# artifacts_dir = \"artifacts\"\n"
    );
    std::fs::write(path, with_header)?;
    println!("wrote sample config to {}", path.display());
    Ok(())
}

fn simulate(
    mut config: AppConfig,
    ticker: &str,
    days: usize,
    paths: usize,
    requester: Option<String>,
    seed: Option<u64>,
    json: bool,
) -> AppResult<()> {
    if seed.is_some() {
        config.simulation.seed = seed;
    }
    let requester = requester.unwrap_or_else(|| DEFAULT_REQUESTER.to_string());
    let series = config.data.loader().load(ticker)?;
    let forecast = config
        .simulation
        .engine()
        .forecast(&series, days, paths, Some(requester.as_str()))?;

    if let Some(dir) = config.simulation.artifacts_dir() {
        let file = dir.join(artifact_file_name(&requester, ticker, paths, days));
        write_paths_csv(&file, &forecast.matrix)?;
        tracing::info!(path = %file.display(), "wrote path artifact");
    }

    let report = forecast.report();
    if json {
        println!("{}", to_json_pretty(&report)?);
    } else {
        for line in report.lines() {
            println!("{line}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    if let Command::SampleConfig { path } = &cli.command {
        return sample_config(path);
    }

    let config = AppConfig::load(&cli.config)?;
    setup_logging(&config, &cli)?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    match cli.command {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.server.bind.clone());
            let state = AppState::from_config(&config);
            server::serve(state, &addr).await?;
        }
        Command::Simulate {
            ticker,
            days,
            paths,
            requester,
            seed,
            json,
        } => {
            tokio::task::spawn_blocking(move || {
                simulate(config, &ticker, days, paths, requester, seed, json)
            })
            .await??;
        }
        Command::SampleConfig { .. } => {}
    }
    Ok(())
}
