//! Command-line front end for opposition predictions.
//!
//! Usage:
//!     opposition predict --input case.toml --filter confusing
//!     opposition check --input case.toml
//!     opposition health

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use opposition_backend::{BackendConfig, HttpBackend, OppositionBackend, StaticCredentials};
use opposition_model::CasePredictionResult;
use opposition_present::{progress_label, render_report, FilterState, LikelihoodFilter, Summary};
use opposition_request::FormState;
use opposition_workflow::Orchestrator;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "opposition")]
#[command(about = "Predict the outcome of a trademark opposition")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Prediction service base URL [default: $OPPOSITION_API_BASE_URL]
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Identity token sent as the bearer credential
    #[arg(long, env = "OPPOSITION_ID_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Request timeout [default: $OPPOSITION_TIMEOUT_SECS or 30]
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full prediction for a case file
    Predict {
        /// Path to the case TOML file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Which comparisons to list (all, confusing, competitive, complementary, high-similarity)
        #[arg(long, default_value = "all")]
        filter: LikelihoodFilter,

        /// Only list comparisons likely to cause confusion
        #[arg(long)]
        confusing_only: bool,
    },

    /// Validate a case file without calling the service
    Check {
        /// Path to the case TOML file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Check prediction service health
    Health,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct PredictionOutput<'a> {
    result: &'a CasePredictionResult,
    summary: Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = backend_config(cli.api_url, cli.timeout_secs);
    let credentials = StaticCredentials::from_optional(cli.token);

    match cli.command {
        Commands::Predict {
            input,
            format,
            filter,
            confusing_only,
        } => {
            let backend = HttpBackend::new(config, credentials)?;
            let filter = FilterState::new(filter, confusing_only);
            run_predict(backend, &input, format, &filter).await?;
        }
        Commands::Check { input } => {
            run_check(&input)?;
        }
        Commands::Health => {
            let backend = HttpBackend::new(config, credentials)?;
            run_health(&backend).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "opposition=debug"
    } else {
        "opposition=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Environment settings, overridden by any flags given.
fn backend_config(api_url: Option<String>, timeout_secs: Option<u64>) -> BackendConfig {
    let mut config = BackendConfig::from_env();
    if let Some(url) = api_url {
        config = config.with_base_url(url);
    }
    if let Some(secs) = timeout_secs {
        config = config.with_timeout_secs(secs);
    }
    config
}

fn load_form(path: &Path) -> Result<FormState> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read case file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid case file {}", path.display()))
}

async fn run_predict(
    backend: HttpBackend<StaticCredentials>,
    input: &Path,
    format: Format,
    filter: &FilterState,
) -> Result<()> {
    let form = load_form(input)?;
    backend.config().validate()?;

    let orchestrator = Orchestrator::new(backend);
    let outcome = orchestrator.submit(&form).await;
    tracing::debug!(status = %progress_label(&orchestrator.snapshot()), "Run finished");
    let result = outcome?;

    match format {
        Format::Json => {
            let output = PredictionOutput {
                result: &result,
                summary: Summary::from_likelihoods(&result.goods_services_likelihoods),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Format::Text => {
            println!("{}", render_report(&result, filter));
        }
    }

    Ok(())
}

fn run_check(input: &Path) -> Result<()> {
    let form = load_form(input)?;

    match form.build() {
        Ok(case) => {
            println!(
                "OK: {} vs {} ({} x {} goods/services pairs)",
                case.applicant.wordmark,
                case.opponent.wordmark,
                case.applicant_goods.len(),
                case.opponent_goods.len()
            );
            Ok(())
        }
        Err(e) => bail!("Invalid case: {}", e),
    }
}

async fn run_health<B: OppositionBackend>(backend: &B) -> Result<()> {
    print!("Checking {} backend... ", backend.name());

    match backend.health_check().await {
        Ok(status) => {
            println!("OK ({})", status.status);
            Ok(())
        }
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}
