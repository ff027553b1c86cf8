use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tiltwatch::application::{AnalysisService, ResultComponent};
use tiltwatch::config::Config;
use tiltwatch::domain::errors::AnalysisError;
use tiltwatch::infrastructure::JsonFileProvider;
use tracing::{error, info};

/// Exit status used when the history is too short to analyze.
const EXIT_INSUFFICIENT_DATA: u8 = 2;

#[derive(Parser)]
#[command(author, version, about = "Player performance analytics over recent match history", long_about = None)]
struct Cli {
    /// JSON export: { playerId, premierRating?, matches: [...] }
    #[arg(short, long)]
    input: PathBuf,

    /// Player to analyze (defaults to the export's playerId)
    #[arg(short, long)]
    player: Option<String>,

    /// Number of most recent matches to analyze
    #[arg(short, long, default_value_t = 20)]
    count: usize,

    /// tilt_detection, performance_state, correlation_analysis, pattern_recognition or all
    #[arg(long, default_value = "all")]
    component: ResultComponent,

    /// TOML file overriding the analysis policy
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.observability.log_level)),
        )
        .with_ansi(!config.observability.plain_logs)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let provider = Arc::new(JsonFileProvider::load(&cli.input).await?);
    let player_id = cli
        .player
        .clone()
        .unwrap_or_else(|| provider.player_id().to_string());
    info!(
        "Analyzing {} of {} matches for {}",
        cli.count,
        provider.match_count(),
        player_id
    );

    let service = AnalysisService::new(provider.clone(), provider, config.analysis)?;
    match service.analyze_player(&player_id, cli.count).await {
        Ok(result) => {
            print_json(&result.view(cli.component), cli.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => match err.downcast_ref::<AnalysisError>() {
            Some(e @ AnalysisError::InsufficientData { observed, required }) => {
                error!("{}", e);
                let body = json!({
                    "error": "insufficient_data",
                    "message": e.to_string(),
                    "observed": observed,
                    "required": required,
                    "playerId": player_id,
                });
                print_json(&body, cli.pretty)?;
                Ok(ExitCode::from(EXIT_INSUFFICIENT_DATA))
            }
            _ => Err(err),
        },
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}
