//! Gradient Boosted Decision Tree (GBDT) trainer
//!
//! Boosts symmetric trees on squared-error loss. Each iteration draws
//! Bayesian bootstrap weights from the seeded LCG, builds one tree on
//! the weighted gradients and adds it with the learning rate. When a
//! validation set is supplied the eval metric is tracked every
//! iteration, training halts after `early_stopping_rounds` iterations
//! without strict improvement, and the ensemble is cut back to the best
//! iteration.

use anyhow::{bail, Result};
use healthscore_core::gbdt::{Model, ModelMetadata};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::binning::FeatureBins;
use crate::deterministic::LcgRng;
use crate::metrics::{root_mean_squared_error, EvalMetric};
use crate::oblivious::{ObliviousBuilder, TreeConfig};

/// Deepest tree accepted (2^16 leaves)
pub const MAX_DEPTH: usize = 16;

/// Highest border count whose bin indices still fit in `u16`
pub const MAX_BORDER_COUNT: usize = u16::MAX as usize - 1;

/// GBDT training configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    pub iterations: usize,
    pub learning_rate: f64,
    pub depth: usize,
    pub l2_leaf_reg: f64,
    /// Maximum split borders per feature
    pub border_count: usize,
    /// Bayesian bootstrap temperature; 0 disables bagging
    pub bagging_temperature: f64,
    pub random_seed: u64,
    /// Patience for the validation metric; inert without a validation set
    pub early_stopping_rounds: Option<usize>,
    pub eval_metric: EvalMetric,
    /// Shrink the ensemble to the best validation iteration
    pub use_best_model: bool,
    /// Log progress every this many iterations
    pub metric_period: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            iterations: 500,
            learning_rate: 0.05,
            depth: 6,
            l2_leaf_reg: 3.0,
            border_count: 254,
            bagging_temperature: 1.0,
            random_seed: 42,
            early_stopping_rounds: Some(50),
            eval_metric: EvalMetric::R2,
            use_best_model: true,
            metric_period: 50,
        }
    }
}

/// Validation data monitored during training (column-major features)
#[derive(Clone, Copy, Debug)]
pub struct EvalSet<'a> {
    pub columns: &'a [Vec<f64>],
    pub targets: &'a [f64],
}

/// Fitted model and the validation trace that produced it
#[derive(Clone, Debug)]
pub struct TrainingOutcome {
    pub model: Model,
    /// Validation metric after each iteration (empty without an eval set)
    pub eval_history: Vec<f64>,
    pub best_iteration: Option<usize>,
    pub iterations_run: usize,
    pub stopped_early: bool,
}

/// GBDT trainer
#[derive(Clone, Debug)]
pub struct GbdtTrainer {
    params: TrainingParams,
}

impl GbdtTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Train on column-major features; `feature_names` fixes the column order
    pub fn fit(
        &self,
        columns: &[Vec<f64>],
        targets: &[f64],
        feature_names: &[String],
        eval: Option<EvalSet<'_>>,
    ) -> Result<TrainingOutcome> {
        let n_samples = targets.len();
        if n_samples == 0 {
            bail!("Training set is empty");
        }
        if columns.len() != feature_names.len() {
            bail!(
                "{} feature columns but {} feature names",
                columns.len(),
                feature_names.len()
            );
        }
        if let Some(bad) = columns.iter().position(|c| c.len() != n_samples) {
            bail!("Feature column {} has {} rows, expected {}", bad, columns[bad].len(), n_samples);
        }
        if let Some(row) = targets.iter().position(|t| !t.is_finite()) {
            bail!("Target at row {} is not finite: {}", row, targets[row]);
        }
        self.check_params()?;

        let eval_rows = match eval {
            Some(set) => Some(Self::eval_rows(set, columns.len())?),
            None => None,
        };

        let params = &self.params;
        let bins = FeatureBins::build(columns, params.border_count);
        let tree_config = TreeConfig {
            depth: params.depth,
            l2_leaf_reg: params.l2_leaf_reg,
        };
        let mut rng = LcgRng::new(params.random_seed);

        let bias = Self::calculate_bias(targets);
        let mut predictions = vec![bias; n_samples];
        let mut eval_predictions = eval.map(|set| vec![bias; set.targets.len()]);

        let mut trees = Vec::with_capacity(params.iterations);
        let mut eval_history = Vec::new();
        let mut best: Option<(usize, f64)> = None;
        let mut stopped_early = false;

        for iteration in 0..params.iterations {
            let weights: Vec<f64> = (0..n_samples)
                .map(|_| rng.bayesian_weight(params.bagging_temperature))
                .collect();
            let (gradients, hessians) =
                Self::calculate_gradients_hessians(targets, &predictions, &weights);

            let built = ObliviousBuilder::new(&bins, &gradients, &hessians, tree_config.clone())
                .build(params.learning_rate);

            for (pred, &leaf) in predictions.iter_mut().zip(&built.leaf_of) {
                *pred += params.learning_rate * built.tree.leaves[leaf];
            }
            debug!(
                "Iteration {}: depth {}, train RMSE {:.6}",
                iteration,
                built.tree.depth(),
                root_mean_squared_error(targets, &predictions)
            );

            if let (Some(set), Some(rows), Some(eval_preds)) =
                (eval, eval_rows.as_ref(), eval_predictions.as_mut())
            {
                for (pred, row) in eval_preds.iter_mut().zip(rows) {
                    *pred += built.tree.contribution(row);
                }
                let score = params.eval_metric.score(set.targets, eval_preds);
                eval_history.push(score);

                let improved = match best {
                    None => true,
                    Some((_, best_score)) => params.eval_metric.is_improvement(score, best_score),
                };
                if improved {
                    best = Some((iteration, score));
                }

                if params.metric_period > 0
                    && (iteration % params.metric_period == 0 || iteration + 1 == params.iterations)
                {
                    let (best_it, best_score) = best.unwrap_or((iteration, score));
                    info!(
                        "{}:\tlearn RMSE {:.4}\ttest {} {:.4}\tbest {:.4} ({})",
                        iteration,
                        root_mean_squared_error(targets, &predictions),
                        params.eval_metric,
                        score,
                        best_score,
                        best_it
                    );
                }

                trees.push(built.tree);

                if let (Some(patience), Some((best_it, _))) = (params.early_stopping_rounds, best) {
                    if iteration - best_it >= patience {
                        info!(
                            "Early stopping at iteration {}: no {} improvement for {} iterations",
                            iteration, params.eval_metric, patience
                        );
                        stopped_early = true;
                        break;
                    }
                }
            } else {
                if params.metric_period > 0 && iteration % params.metric_period == 0 {
                    debug!(
                        "{}:\tlearn RMSE {:.4}",
                        iteration,
                        root_mean_squared_error(targets, &predictions)
                    );
                }
                trees.push(built.tree);
            }
        }

        let iterations_run = trees.len();
        let best_iteration = best.map(|(it, _)| it);

        let metadata = ModelMetadata {
            iterations: params.iterations,
            learning_rate: params.learning_rate,
            depth: params.depth,
            l2_leaf_reg: params.l2_leaf_reg,
            random_seed: params.random_seed,
            best_iteration,
            best_score: best.map(|(_, score)| score),
        };
        let mut model = Model::new(trees, bias, feature_names.to_vec()).with_metadata(metadata);
        if params.use_best_model {
            if let Some(best_it) = best_iteration {
                model.truncate(best_it + 1);
                info!("Shrinking model to first {} iterations", best_it + 1);
            }
        }

        Ok(TrainingOutcome {
            model,
            eval_history,
            best_iteration,
            iterations_run,
            stopped_early,
        })
    }

    fn check_params(&self) -> Result<()> {
        let params = &self.params;
        if params.depth > MAX_DEPTH {
            bail!("Tree depth {} exceeds the maximum of {}", params.depth, MAX_DEPTH);
        }
        if params.border_count == 0 || params.border_count > MAX_BORDER_COUNT {
            bail!(
                "Border count must be in 1..={}, got {}",
                MAX_BORDER_COUNT,
                params.border_count
            );
        }
        if !(params.learning_rate.is_finite() && params.learning_rate > 0.0) {
            bail!("Learning rate must be positive, got {}", params.learning_rate);
        }
        Ok(())
    }

    fn eval_rows(set: EvalSet<'_>, feature_count: usize) -> Result<Vec<Vec<f64>>> {
        if set.columns.len() != feature_count {
            bail!(
                "Validation set has {} features, training set has {}",
                set.columns.len(),
                feature_count
            );
        }
        let n = set.targets.len();
        if let Some(bad) = set.columns.iter().position(|c| c.len() != n) {
            bail!("Validation column {} has {} rows, expected {}", bad, set.columns[bad].len(), n);
        }
        if let Some(row) = set.targets.iter().position(|t| !t.is_finite()) {
            bail!("Validation target at row {} is not finite: {}", row, set.targets[row]);
        }
        Ok((0..n)
            .map(|i| set.columns.iter().map(|col| col[i]).collect())
            .collect())
    }

    /// Initial prediction: mean of targets
    fn calculate_bias(targets: &[f64]) -> f64 {
        targets.iter().sum::<f64>() / targets.len() as f64
    }

    /// Weighted gradients and hessians for squared-error loss
    /// gradient = prediction - target
    /// hessian = 1
    fn calculate_gradients_hessians(
        targets: &[f64],
        predictions: &[f64],
        weights: &[f64],
    ) -> (Vec<f64>, Vec<f64>) {
        targets
            .iter()
            .zip(predictions)
            .zip(weights)
            .map(|((&t, &p), &w)| (w * (p - t), w))
            .unzip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{i}")).collect()
    }

    fn linear_data(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let x0: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let x1: Vec<f64> = (0..n).map(|i| ((i * 7) % 11) as f64).collect();
        let y = x0.iter().zip(&x1).map(|(a, b)| 2.0 * a + b).collect();
        (vec![x0, x1], y)
    }

    fn small_params() -> TrainingParams {
        TrainingParams {
            iterations: 30,
            learning_rate: 0.3,
            depth: 3,
            ..TrainingParams::default()
        }
    }

    #[test]
    fn test_defaults_match_reference_configuration() {
        let p = TrainingParams::default();
        assert_eq!(p.iterations, 500);
        assert_eq!(p.learning_rate, 0.05);
        assert_eq!(p.depth, 6);
        assert_eq!(p.random_seed, 42);
        assert_eq!(p.early_stopping_rounds, Some(50));
        assert_eq!(p.eval_metric, EvalMetric::R2);
    }

    #[test]
    fn test_bias_calculation() {
        assert_eq!(GbdtTrainer::calculate_bias(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_train_reduces_error() -> Result<()> {
        let (x, y) = linear_data(60);
        let outcome = GbdtTrainer::new(small_params()).fit(&x, &y, &names(2), None)?;

        assert_eq!(outcome.model.trees.len(), 30);
        assert!(outcome.eval_history.is_empty());
        assert!(outcome.best_iteration.is_none());

        let preds = outcome.model.predict_columns(&x)?;
        let baseline = root_mean_squared_error(&y, &vec![outcome.model.bias; y.len()]);
        assert!(root_mean_squared_error(&y, &preds) < baseline * 0.5);
        Ok(())
    }

    #[test]
    fn test_determinism() -> Result<()> {
        let (x, y) = linear_data(40);
        let trainer = GbdtTrainer::new(small_params());
        let m1 = trainer.fit(&x, &y, &names(2), None)?.model;
        let m2 = trainer.fit(&x, &y, &names(2), None)?.model;
        assert_eq!(m1, m2);

        let other_seed = GbdtTrainer::new(TrainingParams {
            random_seed: 7,
            ..small_params()
        });
        let m3 = other_seed.fit(&x, &y, &names(2), None)?.model;
        assert_ne!(m1, m3);
        Ok(())
    }

    #[test]
    fn test_early_stopping_truncates_to_best() -> Result<()> {
        let (x, y) = linear_data(40);
        // validation targets unrelated to features: the metric peaks early
        let eval_x = vec![vec![5.0, 30.0, 12.0, 22.0], vec![1.0, 2.0, 3.0, 4.0]];
        let eval_y = vec![50.0, 0.0, 50.0, 0.0];

        let params = TrainingParams {
            iterations: 200,
            early_stopping_rounds: Some(5),
            ..small_params()
        };
        let outcome = GbdtTrainer::new(params).fit(
            &x,
            &y,
            &names(2),
            Some(EvalSet {
                columns: &eval_x,
                targets: &eval_y,
            }),
        )?;

        let best = outcome.best_iteration.expect("eval set supplied");
        assert!(outcome.stopped_early);
        assert_eq!(outcome.iterations_run, best + 6);
        assert_eq!(outcome.model.trees.len(), best + 1);
        assert_eq!(outcome.eval_history.len(), outcome.iterations_run);
        assert_eq!(outcome.model.metadata.best_iteration, Some(best));
        Ok(())
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let trainer = GbdtTrainer::new(small_params());
        assert!(trainer.fit(&[], &[], &[], None).is_err());
        assert!(trainer
            .fit(&[vec![1.0, 2.0]], &[1.0, 2.0], &names(2), None)
            .is_err());

        let eval_x = vec![vec![1.0]];
        let result = trainer.fit(
            &[vec![1.0, 2.0], vec![3.0, 4.0]],
            &[1.0, 2.0],
            &names(2),
            Some(EvalSet {
                columns: &eval_x,
                targets: &[1.0],
            }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_finite_targets() {
        let (x, mut y) = linear_data(20);
        y[3] = f64::NAN;
        let err = GbdtTrainer::new(small_params())
            .fit(&x, &y, &names(2), None)
            .unwrap_err();
        assert!(err.to_string().contains("row 3"), "{err}");

        let (x, y) = linear_data(20);
        let eval_x = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let result = GbdtTrainer::new(small_params()).fit(
            &x,
            &y,
            &names(2),
            Some(EvalSet {
                columns: &eval_x,
                targets: &[1.0, f64::INFINITY],
            }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_out_of_range_params() {
        let (x, y) = linear_data(20);
        for params in [
            TrainingParams {
                depth: 64,
                ..small_params()
            },
            TrainingParams {
                depth: MAX_DEPTH + 1,
                ..small_params()
            },
            TrainingParams {
                border_count: MAX_BORDER_COUNT + 1,
                ..small_params()
            },
            TrainingParams {
                border_count: 0,
                ..small_params()
            },
            TrainingParams {
                learning_rate: f64::NAN,
                ..small_params()
            },
        ] {
            let result = GbdtTrainer::new(params.clone()).fit(&x, &y, &names(2), None);
            assert!(result.is_err(), "{params:?}");
        }

        let deepest = TrainingParams {
            depth: MAX_DEPTH,
            iterations: 1,
            ..small_params()
        };
        assert!(GbdtTrainer::new(deepest).fit(&x, &y, &names(2), None).is_ok());
    }
}
