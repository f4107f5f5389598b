//! K-fold cross-validation
//!
//! Folds are contiguous and unshuffled; the first `n % k` folds take one
//! extra row. Each fold trains a fresh model with the same parameters and
//! no validation set, so early stopping never triggers inside a fold.
//! Folds run in parallel over shared read-only data.

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics::r2_score;
use crate::trainer::{GbdtTrainer, TrainingParams};

/// A single train/test split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub index: usize,
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// K-fold splitter without shuffling
#[derive(Debug, Clone, Copy)]
pub struct KFold {
    n_splits: usize,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>> {
        let k = self.n_splits;
        if k < 2 {
            bail!("Cross-validation needs at least 2 folds, got {}", k);
        }
        if k > n_samples {
            bail!("Cannot make {} folds from {} samples", k, n_samples);
        }

        let base = n_samples / k;
        let extra = n_samples % k;
        let mut start = 0;
        let mut folds = Vec::with_capacity(k);

        for index in 0..k {
            let size = base + usize::from(index < extra);
            let end = start + size;
            folds.push(Fold {
                index,
                train: (0..start).chain(end..n_samples).collect(),
                test: (start..end).collect(),
            });
            start = end;
        }

        Ok(folds)
    }
}

/// Per-fold R² scores and their mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvReport {
    pub fold_scores: Vec<f64>,
    pub mean: f64,
}

fn take(columns: &[Vec<f64>], rows: &[usize]) -> Vec<Vec<f64>> {
    columns
        .iter()
        .map(|col| rows.iter().map(|&i| col[i]).collect())
        .collect()
}

/// Cross-validated R² of the trainer configuration on column-major data
pub fn cross_val_score(
    params: &TrainingParams,
    columns: &[Vec<f64>],
    targets: &[f64],
    feature_names: &[String],
    n_splits: usize,
) -> Result<CvReport> {
    let folds = KFold::new(n_splits).split(targets.len())?;

    let fold_scores = folds
        .par_iter()
        .map(|fold| -> Result<f64> {
            let train_x = take(columns, &fold.train);
            let train_y: Vec<f64> = fold.train.iter().map(|&i| targets[i]).collect();
            let test_x = take(columns, &fold.test);
            let test_y: Vec<f64> = fold.test.iter().map(|&i| targets[i]).collect();

            let outcome = GbdtTrainer::new(params.clone())
                .fit(&train_x, &train_y, feature_names, None)
                .with_context(|| format!("Training fold {} failed", fold.index))?;
            let preds = outcome.model.predict_columns(&test_x)?;
            let score = r2_score(&test_y, &preds);

            debug!("Fold {}: R2 {:.4}", fold.index, score);
            Ok(score)
        })
        .collect::<Result<Vec<f64>>>()?;

    let mean = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
    Ok(CvReport { fold_scores, mean })
}
