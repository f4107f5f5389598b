//! Regression metrics
//!
//! Inputs are paired slices of equal length. Empty input yields NaN.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coefficient of determination
///
/// A constant target (zero total variance) scores 1.0 when predicted
/// exactly and 0.0 otherwise. Fewer than two samples is undefined (NaN).
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.len() < 2 {
        return f64::NAN;
    }

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return f64::NAN;
    }
    y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64
}

pub fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mean_squared_error(y_true, y_pred).sqrt()
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return f64::NAN;
    }
    y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / y_true.len() as f64
}

/// Metric monitored on the validation set during boosting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EvalMetric {
    #[default]
    #[serde(rename = "R2")]
    R2,
    #[serde(rename = "RMSE")]
    Rmse,
    #[serde(rename = "MAE")]
    Mae,
}

impl EvalMetric {
    pub fn score(&self, y_true: &[f64], y_pred: &[f64]) -> f64 {
        match self {
            EvalMetric::R2 => r2_score(y_true, y_pred),
            EvalMetric::Rmse => root_mean_squared_error(y_true, y_pred),
            EvalMetric::Mae => mean_absolute_error(y_true, y_pred),
        }
    }

    pub fn higher_is_better(&self) -> bool {
        matches!(self, EvalMetric::R2)
    }

    /// Strict improvement of `candidate` over `best`
    pub fn is_improvement(&self, candidate: f64, best: f64) -> bool {
        if self.higher_is_better() {
            candidate > best
        } else {
            candidate < best
        }
    }
}

impl fmt::Display for EvalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvalMetric::R2 => "R2",
            EvalMetric::Rmse => "RMSE",
            EvalMetric::Mae => "MAE",
        };
        f.write_str(name)
    }
}

/// Held-out test metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
}

impl RegressionMetrics {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Self {
        Self {
            r2: r2_score(y_true, y_pred),
            rmse: root_mean_squared_error(y_true, y_pred),
            mae: mean_absolute_error(y_true, y_pred),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() {
        let y = [1.0, 2.0, 3.0];
        let m = RegressionMetrics::compute(&y, &y);
        assert_eq!(m.r2, 1.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);
    }

    #[test]
    fn test_known_values() {
        let y_true = [3.0, -0.5, 2.0, 7.0];
        let y_pred = [2.5, 0.0, 2.0, 8.0];

        assert!((r2_score(&y_true, &y_pred) - 0.948_608_137_044_967_9).abs() < 1e-12);
        assert_eq!(mean_squared_error(&y_true, &y_pred), 0.375);
        assert_eq!(mean_absolute_error(&y_true, &y_pred), 0.5);
        assert!((root_mean_squared_error(&y_true, &y_pred) - 0.375f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_mean_predictor_scores_zero() {
        let y_true = [1.0, 2.0, 3.0, 4.0];
        let y_pred = [2.5; 4];
        assert_eq!(r2_score(&y_true, &y_pred), 0.0);
    }

    #[test]
    fn test_constant_target() {
        assert_eq!(r2_score(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
        assert_eq!(r2_score(&[5.0, 5.0], &[4.0, 5.0]), 0.0);
        assert!(r2_score(&[5.0], &[5.0]).is_nan());
    }

    #[test]
    fn test_improvement_direction() {
        assert!(EvalMetric::R2.is_improvement(0.9, 0.8));
        assert!(!EvalMetric::R2.is_improvement(0.8, 0.8));
        assert!(EvalMetric::Rmse.is_improvement(1.0, 2.0));
        assert_eq!(EvalMetric::default(), EvalMetric::R2);
    }
}
