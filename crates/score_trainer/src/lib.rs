//! Health-score trainer - symmetric-tree GBDT training pipeline
//!
//! Loads the packaged-food CSV, engineers ratio features, splits and
//! scales the data, boosts a symmetric-tree ensemble with early stopping,
//! evaluates it on the held-out partition and with k-fold CV, and writes
//! the model, scaler and feature order as three artifacts.

pub mod binning;
pub mod config;
pub mod cross_validation;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod metrics;
pub mod oblivious;
pub mod pipeline;
pub mod split;
pub mod trainer;

pub use config::TrainerConfig;
pub use cross_validation::{cross_val_score, CvReport, KFold};
pub use dataset::{load_csv, Dataset};
pub use deterministic::{LcgRng, SplitTieBreaker};
pub use errors::TrainerError;
pub use metrics::{EvalMetric, RegressionMetrics};
pub use pipeline::{PipelineReport, SamplePrediction};
pub use split::{train_test_split, TrainTestSplit};
pub use trainer::{EvalSet, GbdtTrainer, TrainingOutcome, TrainingParams};

/// Run the full training pipeline described by `config`.
pub fn run_pipeline(config: &TrainerConfig) -> Result<PipelineReport, TrainerError> {
    config.validate()?;

    let loaded = pipeline::load(&config.data.input).map_err(dataset_error)?;
    let engineered =
        pipeline::engineer(loaded, &config.data.target_column).map_err(dataset_error)?;
    let partitioned = pipeline::partition(&engineered, &config.split).map_err(dataset_error)?;
    let scaled = pipeline::scale(partitioned).map_err(training_error)?;
    let trained = pipeline::train(scaled, &config.model).map_err(training_error)?;
    let evaluated = pipeline::evaluate(trained, &config.model, config.cross_validation.folds)
        .map_err(|err| TrainerError::Evaluation(format!("{:#}", err)))?;
    let persisted = pipeline::persist(evaluated, &config.output.dir)
        .map_err(|err| TrainerError::Persist(format!("{:#}", err)))?;

    persisted
        .report(&engineered)
        .map_err(|err| TrainerError::Evaluation(format!("{:#}", err)))
}

fn dataset_error(err: anyhow::Error) -> TrainerError {
    TrainerError::Dataset(format!("{:#}", err))
}

fn training_error(err: anyhow::Error) -> TrainerError {
    TrainerError::Training(format!("{:#}", err))
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
