//! Batch prediction entry point invoked by the pipeline orchestrator.
//!
//! Loads the dataset, resolves the servable model, drives the scorer
//! across every row, and publishes the result artifacts. Exits zero on
//! full-dataset completion even when individual rows were skipped;
//! non-zero when the dataset or model cannot be loaded.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use prediction_scoring_pipeline::{
    config::AppConfig,
    dataset::{Dataset, DEFAULT_ID_COLUMN},
    encoder,
    metrics::ScoringMetrics,
    model, publisher,
    scorer::BatchScorer,
    PredictionClient,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Local,
    Cloud,
}

#[derive(Parser)]
#[command(name = "predict-batch")]
#[command(about = "Batch-score a dataset against a prediction-serving endpoint", version)]
struct Cli {
    /// Directory for the scoring artifacts.
    #[arg(long)]
    output: PathBuf,

    /// Path of the test data file.
    #[arg(long)]
    data: PathBuf,

    /// Path of the json schema file describing the input data.
    #[arg(long)]
    schema: PathBuf,

    /// Path of the trained model directory.
    #[arg(long)]
    model: PathBuf,

    /// Name of the column for the prediction target.
    #[arg(long)]
    target: String,

    /// Project the job runs under (recorded for the orchestrator).
    #[arg(long)]
    project: String,

    /// Whether to run the job locally or in the cloud.
    #[arg(long, value_enum, default_value = "local")]
    mode: Mode,

    /// Batch size used in prediction (reserved).
    #[arg(long, default_value_t = 32)]
    batchsize: usize,

    /// Pipeline configuration file.
    #[arg(long, default_value = "config/config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("prediction_scoring_pipeline=info".parse()?)
                .add_directive("predict_batch=info".parse()?),
        )
        .init();

    info!("Starting batch prediction");

    let config = if cli.config.exists() {
        AppConfig::load_from_path(&cli.config)?
    } else {
        AppConfig::default()
    };
    info!(
        project = %cli.project,
        mode = ?cli.mode,
        batchsize = cli.batchsize,
        input_schema = %cli.schema.display(),
        endpoint = format!("{}:{}", config.serving.host, config.serving.port),
        "run parameters"
    );

    // Fatal before any row: the model must be exported in the expected layout.
    let export_dir =
        model::resolve_export_dir(&cli.model).context("model directory cannot be loaded")?;
    info!(export = %export_dir.display(), "servable model located");

    // Fatal before any row: the dataset must be readable.
    let dataset = Dataset::from_csv(&cli.data, DEFAULT_ID_COLUMN, &cli.target)
        .context("dataset cannot be read")?;

    let client = PredictionClient::new(config.serving.clone())?;

    if config.scoring.contract_check {
        if let Some(record) = dataset.records().first() {
            client
                .contract_check(&encoder::encode(&record.features))
                .await
                .context("serving model failed the class-ordering contract check")?;
        }
    }

    let metrics = ScoringMetrics::new();
    let scorer = BatchScorer::new(config.scoring.concurrency);
    let outcome = scorer.run(&dataset, &client, &metrics).await;

    metrics.print_summary();
    if outcome.skipped > 0 {
        warn!(skipped = outcome.skipped, "rows skipped during scoring");
    }

    let cloud = cli.mode == Mode::Cloud || cli.output.to_string_lossy().starts_with("gs://");
    let status = publisher::publish(&cli.output, &outcome.table, cloud)?;

    info!(
        results = %status.results_path.display(),
        rows = outcome.table.len(),
        skipped = outcome.skipped,
        "batch prediction complete"
    );

    Ok(())
}
