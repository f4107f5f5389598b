//! Robust feature scaling
//!
//! Centers each column on its median and divides by its interquartile
//! range. Parameters are learned once from training data; `transform`
//! borrows the scaler immutably so applying it can never refit it.

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Spreads below this are treated as zero and replaced by 1.0
const ZERO_SCALE_TOLERANCE: f64 = 10.0 * f64::EPSILON;

/// Per-column robust scaling parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    /// Median of the training values
    pub center: f64,
    /// Interquartile range, or 1.0 when degenerate
    pub scale: f64,
}

/// Median/IQR scaler fitted on column-major data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    params: Vec<ColumnScale>,
}

impl RobustScaler {
    /// Learn median and IQR for every column, ignoring NaN values
    pub fn fit(columns: &[Vec<f64>]) -> Result<Self> {
        if columns.is_empty() {
            return Err(CoreError::Scaler("cannot fit on zero columns".to_string()));
        }

        let params = columns.iter().map(|col| column_scale(col)).collect();
        Ok(Self { params })
    }

    pub fn params(&self) -> &[ColumnScale] {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.params.len()
    }

    /// Scale column-major data with the fitted parameters
    pub fn transform(&self, columns: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.check_width(columns.len())?;

        Ok(columns
            .iter()
            .zip(&self.params)
            .map(|(col, p)| col.iter().map(|&v| (v - p.center) / p.scale).collect())
            .collect())
    }

    /// Scale a single row given in training column order
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.check_width(row.len())?;

        Ok(row
            .iter()
            .zip(&self.params)
            .map(|(&v, p)| (v - p.center) / p.scale)
            .collect())
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width != self.params.len() {
            return Err(CoreError::ShapeMismatch(format!(
                "scaler fitted on {} features, got {}",
                self.params.len(),
                width
            )));
        }
        Ok(())
    }
}

fn column_scale(values: &[f64]) -> ColumnScale {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return ColumnScale {
            center: 0.0,
            scale: 1.0,
        };
    }
    sorted.sort_by(f64::total_cmp);

    let center = percentile(&sorted, 0.5);
    let iqr = percentile(&sorted, 0.75) - percentile(&sorted, 0.25);
    let scale = if iqr.abs() < ZERO_SCALE_TOLERANCE { 1.0 } else { iqr };

    ColumnScale { center, scale }
}

/// Linear-interpolated percentile of sorted, non-empty data
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
