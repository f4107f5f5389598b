//! Health-score trainer CLI
//!
//! Trains the packaged-food health-score regressor and writes its artifacts.

use anyhow::{Context, Result};
use clap::Parser;
use healthscore_trainer::{run_pipeline, TrainerConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "score-trainer")]
#[command(author = "Healthscore Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train the packaged-food health-score GBDT model", long_about = None)]
struct Args {
    /// Input CSV dataset path
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for the model, scaler and feature list
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of boosting iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Learning rate
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Tree depth
    #[arg(long)]
    depth: Option<usize>,

    /// Seed for the train/test split and bootstrap weights
    #[arg(long)]
    seed: Option<u64>,

    /// Number of cross-validation folds
    #[arg(long)]
    cv_folds: Option<usize>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<TrainerConfig> {
        let mut config = match &self.config {
            Some(path) => TrainerConfig::from_toml_file(path)?,
            None => TrainerConfig::default(),
        };

        if let Some(input) = self.input {
            config.data.input = input;
        }
        if let Some(output) = self.output {
            config.output.dir = output;
        }
        if let Some(iterations) = self.iterations {
            config.model.iterations = iterations;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.model.learning_rate = learning_rate;
        }
        if let Some(depth) = self.depth {
            config.model.depth = depth;
        }
        if let Some(seed) = self.seed {
            config.split.seed = seed;
            config.model.random_seed = seed;
        }
        if let Some(folds) = self.cv_folds {
            config.cross_validation.folds = folds;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging; RUST_LOG takes precedence over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Health Score Trainer v{}", env!("CARGO_PKG_VERSION"));
    info!("═══════════════════════════════════════════");

    let config = args.into_config()?;
    let report = run_pipeline(&config).context("Training pipeline failed")?;
    report.log_summary();

    info!("✓ Training completed successfully");
    Ok(())
}
