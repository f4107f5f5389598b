//! GBDT ensemble model
//!
//! Score = bias + sum of weighted tree outputs. The model carries the
//! ordered feature names it was trained on; inputs must follow that order.

use serde::{Deserialize, Serialize};

use super::tree::Tree;
use crate::errors::{CoreError, Result};
use crate::serialization::{canonical_json_string, hash_canonical_hex};

/// Current model format version
pub const MODEL_VERSION: u32 = 1;

/// Training parameters and outcome recorded alongside the trees
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModelMetadata {
    /// Boosting iterations requested
    pub iterations: usize,
    pub learning_rate: f64,
    pub depth: usize,
    pub l2_leaf_reg: f64,
    pub random_seed: u64,
    /// Best validation iteration (0-based) when early stopping was monitored
    pub best_iteration: Option<usize>,
    /// Validation score at `best_iteration`
    pub best_score: Option<f64>,
}

/// Symmetric-tree gradient boosted regressor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    pub version: u32,

    /// Starting prediction before any tree (mean training target)
    pub bias: f64,

    /// Trees in boosting order
    pub trees: Vec<Tree>,

    /// Feature names in the exact order the trees index them
    pub feature_names: Vec<String>,

    pub metadata: ModelMetadata,
}

impl Model {
    pub fn new(trees: Vec<Tree>, bias: f64, feature_names: Vec<String>) -> Self {
        Self {
            version: MODEL_VERSION,
            bias,
            trees,
            feature_names,
            metadata: ModelMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<()> {
        if self.version != MODEL_VERSION {
            return Err(CoreError::ValidationFailed(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }

        if !self.bias.is_finite() {
            return Err(CoreError::ValidationFailed("Bias is not finite".to_string()));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_count()).map_err(|e| {
                CoreError::ValidationFailed(format!("Tree {} validation failed: {}", i, e))
            })?;
        }

        Ok(())
    }

    /// Score one feature vector given in training column order
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.feature_count() {
            return Err(CoreError::ShapeMismatch(format!(
                "model expects {} features, got {}",
                self.feature_count(),
                features.len()
            )));
        }
        Ok(self.predict_unchecked(features))
    }

    /// Score without the width check; caller guarantees the length
    pub fn predict_unchecked(&self, features: &[f64]) -> f64 {
        self.bias
            + self
                .trees
                .iter()
                .map(|tree| tree.contribution(features))
                .sum::<f64>()
    }

    /// Score every row of column-major data
    pub fn predict_columns(&self, columns: &[Vec<f64>]) -> Result<Vec<f64>> {
        if columns.len() != self.feature_count() {
            return Err(CoreError::ShapeMismatch(format!(
                "model expects {} features, got {}",
                self.feature_count(),
                columns.len()
            )));
        }

        let n = columns.first().map_or(0, Vec::len);
        let mut row = vec![0.0; columns.len()];
        Ok((0..n)
            .map(|i| {
                for (slot, col) in row.iter_mut().zip(columns) {
                    *slot = col[i];
                }
                self.predict_unchecked(&row)
            })
            .collect())
    }

    /// Keep only the first `n_trees` trees
    pub fn truncate(&mut self, n_trees: usize) {
        self.trees.truncate(n_trees);
    }

    /// Canonical JSON (sorted keys) of the full model
    pub fn to_canonical_json(&self) -> Result<String> {
        canonical_json_string(self)
    }

    /// Blake3 hash of the canonical JSON, hex encoded
    pub fn hash_hex(&self) -> Result<String> {
        hash_canonical_hex(self)
    }
}
