//! Training pipeline
//!
//! Each stage consumes the value produced by the previous one:
//! `Loaded -> Engineered -> Partitioned -> Scaled -> Trained -> Evaluated -> Persisted`.
//! Nothing is shared between stages except through these values.

use anyhow::{Context, Result};
use healthscore_core::features::DERIVED_COLUMNS;
use healthscore_core::{
    engineer_features, ArtifactPaths, ArtifactSet, HealthRating, RobustScaler, Table,
};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::config::SplitConfig;
use crate::cross_validation::{cross_val_score, CvReport};
use crate::dataset::{load_csv, Dataset};
use crate::metrics::RegressionMetrics;
use crate::split::train_test_split;
use crate::trainer::{EvalSet, GbdtTrainer, TrainingOutcome, TrainingParams};

const RULE: &str = "═══════════════════════════════════════════";

/// Raw table as read from disk
#[derive(Debug, Clone)]
pub struct Loaded {
    pub table: Table,
}

/// Features with derived columns appended, target separated
#[derive(Debug, Clone)]
pub struct Engineered {
    pub dataset: Dataset,
    /// Rows with a NaN or infinite derived feature
    pub non_finite_rows: usize,
}

#[derive(Debug, Clone)]
pub struct Partitioned {
    pub train: Dataset,
    pub test: Dataset,
}

/// Column-major scaled features; the scaler saw only the training rows
#[derive(Debug, Clone)]
pub struct Scaled {
    pub scaler: RobustScaler,
    pub feature_names: Vec<String>,
    pub train_x: Vec<Vec<f64>>,
    pub train_y: Vec<f64>,
    pub test_x: Vec<Vec<f64>>,
    pub test_y: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Trained {
    pub data: Scaled,
    pub outcome: TrainingOutcome,
}

#[derive(Debug, Clone)]
pub struct Evaluated {
    pub trained: Trained,
    pub test_predictions: Vec<f64>,
    pub metrics: RegressionMetrics,
    pub cv: CvReport,
}

#[derive(Debug, Clone)]
pub struct Persisted {
    pub evaluated: Evaluated,
    pub paths: ArtifactPaths,
    pub model_hash: String,
}

/// Prediction for one held-out product
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePrediction {
    pub actual: f64,
    pub predicted: f64,
    pub abs_error: f64,
    pub rating: HealthRating,
}

/// Outcome of a full run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub non_finite_rows: usize,
    pub feature_names: Vec<String>,
    pub trees: usize,
    pub best_iteration: Option<usize>,
    pub metrics: RegressionMetrics,
    pub cv: CvReport,
    pub artifacts: Vec<String>,
    pub model_hash: String,
    pub sample: SamplePrediction,
}

impl PipelineReport {
    /// Print the end-of-run summary block
    pub fn log_summary(&self) {
        info!("{}", RULE);
        info!("Model: symmetric-tree gradient boosting ({} trees)", self.trees);
        if let Some(best) = self.best_iteration {
            info!("  Best iteration: {}", best);
        }
        info!("  Test R2:   {:.4}", self.metrics.r2);
        info!("  Test RMSE: {:.4}", self.metrics.rmse);
        info!("  Test MAE:  {:.4}", self.metrics.mae);
        info!(
            "  CV R2 ({} folds): {:.4}",
            self.cv.fold_scores.len(),
            self.cv.mean
        );
        info!("Files saved:");
        for path in &self.artifacts {
            info!("  {}", path);
        }
        info!("Model hash: {}", self.model_hash);
        info!("{}", RULE);
        info!("Sample prediction (first test row):");
        info!("  Actual:    {:.2}", self.sample.actual);
        info!("  Predicted: {:.2}", self.sample.predicted);
        info!("  Error:     {:.2}", self.sample.abs_error);
        info!("  Rating:    {}", self.sample.rating);
    }
}

pub fn load(input: &Path) -> Result<Loaded> {
    info!("Loading dataset from: {}", input.display());
    let table = load_csv(input).context("Failed to load dataset")?;
    info!("Loaded {} rows with {} columns", table.n_rows(), table.n_cols());
    Ok(Loaded { table })
}

pub fn engineer(loaded: Loaded, target: &str) -> Result<Engineered> {
    let engineered = engineer_features(&loaded.table).context("Feature engineering failed")?;
    let dataset = Dataset::from_table(&engineered.table, target)?;

    info!(
        "Engineered {} derived features, {} features total",
        DERIVED_COLUMNS.len(),
        dataset.features.n_cols()
    );
    for (name, (min, max)) in dataset.feature_names().iter().zip(dataset.feature_stats()) {
        debug!("  {}: min={}, max={}", name, min, max);
    }

    Ok(Engineered {
        dataset,
        non_finite_rows: engineered.non_finite_rows,
    })
}

pub fn partition(engineered: &Engineered, split: &SplitConfig) -> Result<Partitioned> {
    let dataset = &engineered.dataset;
    let indices = train_test_split(dataset.len(), split.test_fraction, split.seed)
        .context("Failed to split dataset")?;

    info!(
        "Split {} rows into {} train / {} test (seed {})",
        dataset.len(),
        indices.train.len(),
        indices.test.len(),
        split.seed
    );

    Ok(Partitioned {
        train: dataset.subset(&indices.train),
        test: dataset.subset(&indices.test),
    })
}

pub fn scale(partitioned: Partitioned) -> Result<Scaled> {
    let Partitioned { train, test } = partitioned;
    let scaler = RobustScaler::fit(train.features.columns()).context("Failed to fit scaler")?;
    let train_x = scaler.transform(train.features.columns())?;
    let test_x = scaler.transform(test.features.columns())?;
    debug!("Fitted robust scaler on {} training rows", train.len());

    Ok(Scaled {
        feature_names: train.feature_names().to_vec(),
        scaler,
        train_x,
        train_y: train.targets,
        test_x,
        test_y: test.targets,
    })
}

pub fn train(data: Scaled, params: &TrainingParams) -> Result<Trained> {
    info!("Training configuration:");
    info!("  Iterations: {}", params.iterations);
    info!("  Learning rate: {}", params.learning_rate);
    info!("  Depth: {}", params.depth);
    info!("  L2 leaf reg: {}", params.l2_leaf_reg);
    info!("  Seed: {}", params.random_seed);
    info!("{}", RULE);
    info!("Starting training...");

    let outcome = GbdtTrainer::new(params.clone())
        .fit(
            &data.train_x,
            &data.train_y,
            &data.feature_names,
            Some(EvalSet {
                columns: &data.test_x,
                targets: &data.test_y,
            }),
        )
        .context("Model training failed")?;

    info!(
        "Training complete: {} iterations run, {} trees kept",
        outcome.iterations_run,
        outcome.model.trees.len()
    );
    Ok(Trained { data, outcome })
}

pub fn evaluate(trained: Trained, params: &TrainingParams, folds: usize) -> Result<Evaluated> {
    let data = &trained.data;
    let test_predictions = trained.outcome.model.predict_columns(&data.test_x)?;
    let metrics = RegressionMetrics::compute(&data.test_y, &test_predictions);
    info!(
        "Test metrics: R2 {:.4}, RMSE {:.4}, MAE {:.4}",
        metrics.r2, metrics.rmse, metrics.mae
    );

    info!("Running {}-fold cross-validation on the training partition", folds);
    let cv = cross_val_score(params, &data.train_x, &data.train_y, &data.feature_names, folds)
        .context("Cross-validation failed")?;
    info!("CV R2 scores: {:?} (mean {:.4})", cv.fold_scores, cv.mean);

    Ok(Evaluated {
        trained,
        test_predictions,
        metrics,
        cv,
    })
}

pub fn persist(evaluated: Evaluated, dir: &Path) -> Result<Persisted> {
    let paths = ArtifactPaths::in_dir(dir);
    let data = &evaluated.trained.data;
    let artifacts = ArtifactSet::new(
        evaluated.trained.outcome.model.clone(),
        data.scaler.clone(),
        data.feature_names.clone(),
    );
    artifacts
        .save(&paths)
        .with_context(|| format!("Failed to save artifacts to {}", dir.display()))?;

    let model_hash = artifacts.model.hash_hex()?;
    for path in paths.all() {
        info!("Saved {}", path.display());
    }
    info!("Model hash: {}", model_hash);

    Ok(Persisted {
        evaluated,
        paths,
        model_hash,
    })
}

impl Persisted {
    /// Assemble the run summary; `engineered` supplies the pre-split counts
    pub fn report(&self, engineered: &Engineered) -> Result<PipelineReport> {
        let evaluated = &self.evaluated;
        let data = &evaluated.trained.data;
        let outcome = &evaluated.trained.outcome;

        let (&actual, &predicted) = data
            .test_y
            .first()
            .zip(evaluated.test_predictions.first())
            .context("Test partition is empty")?;
        let sample = SamplePrediction {
            actual,
            predicted,
            abs_error: (actual - predicted).abs(),
            rating: HealthRating::from_score(predicted),
        };

        Ok(PipelineReport {
            n_rows: engineered.dataset.len(),
            n_train: data.train_y.len(),
            n_test: data.test_y.len(),
            non_finite_rows: engineered.non_finite_rows,
            feature_names: data.feature_names.clone(),
            trees: outcome.model.trees.len(),
            best_iteration: outcome.best_iteration,
            metrics: evaluated.metrics,
            cv: evaluated.cv.clone(),
            artifacts: self
                .paths
                .all()
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            model_hash: self.model_hash.clone(),
            sample,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthscore_core::features::{CALORIES, CARBS, FAT, PROTEIN, SUGAR, TARGET};

    fn food_table(n: usize) -> Table {
        let names = vec![
            PROTEIN.to_string(),
            CALORIES.to_string(),
            TARGET.to_string(),
            FAT.to_string(),
            CARBS.to_string(),
            SUGAR.to_string(),
        ];
        let protein: Vec<f64> = (0..n).map(|i| (i % 17) as f64).collect();
        let calories: Vec<f64> = (0..n).map(|i| 100.0 + ((i * 37) % 400) as f64).collect();
        let fat: Vec<f64> = (0..n).map(|i| ((i * 5) % 30) as f64).collect();
        let carbs: Vec<f64> = (0..n).map(|i| ((i * 11) % 70) as f64).collect();
        let sugar: Vec<f64> = (0..n).map(|i| ((i * 3) % 40) as f64).collect();
        let target = (0..n)
            .map(|i| 50.0 + 2.0 * protein[i] - 0.5 * sugar[i] - 0.3 * fat[i])
            .collect();
        Table::from_columns(names, vec![protein, calories, target, fat, carbs, sugar]).unwrap()
    }

    #[test]
    fn test_engineer_orders_features() {
        let engineered = engineer(Loaded { table: food_table(20) }, TARGET).unwrap();
        let names = engineered.dataset.feature_names();

        assert_eq!(names.len(), 5 + DERIVED_COLUMNS.len());
        assert_eq!(&names[..5], &[PROTEIN, CALORIES, FAT, CARBS, SUGAR]);
        assert_eq!(&names[5..], &DERIVED_COLUMNS);
        assert!(!names.iter().any(|n| n == TARGET));
        assert_eq!(engineered.non_finite_rows, 0);
    }

    #[test]
    fn test_scaler_sees_only_training_rows() {
        let engineered = engineer(Loaded { table: food_table(50) }, TARGET).unwrap();
        let partitioned = partition(&engineered, &SplitConfig::default()).unwrap();
        let expected = RobustScaler::fit(partitioned.train.features.columns()).unwrap();

        let scaled = scale(partitioned).unwrap();
        assert_eq!(scaled.scaler, expected);
        assert_eq!(scaled.train_y.len(), 40);
        assert_eq!(scaled.test_y.len(), 10);
    }

    #[test]
    fn test_stages_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let params = TrainingParams {
            iterations: 30,
            learning_rate: 0.3,
            depth: 3,
            early_stopping_rounds: Some(10),
            ..TrainingParams::default()
        };

        let engineered = engineer(Loaded { table: food_table(60) }, TARGET).unwrap();
        let partitioned = partition(&engineered, &SplitConfig::default()).unwrap();
        let trained = train(scale(partitioned).unwrap(), &params).unwrap();
        let evaluated = evaluate(trained, &params, 3).unwrap();
        let persisted = persist(evaluated, dir.path()).unwrap();
        let report = persisted.report(&engineered).unwrap();

        assert_eq!(report.n_rows, 60);
        assert_eq!(report.n_train, 48);
        assert_eq!(report.n_test, 12);
        assert_eq!(report.cv.fold_scores.len(), 3);
        assert_eq!(report.model_hash.len(), 64);
        assert_eq!(
            report.sample.abs_error,
            (report.sample.actual - report.sample.predicted).abs()
        );
        for path in persisted.paths.all() {
            assert!(path.metadata().unwrap().len() > 0);
        }
    }
}
