//! Symmetric (oblivious) decision trees
//!
//! Every node on a given level shares the same split, so a tree of depth
//! `d` is just `d` splits plus `2^d` leaf values. The leaf index is built
//! bit by bit from the root level down: a feature value strictly greater
//! than the threshold sets the bit. NaN compares false and falls to the
//! low side on every level.

use serde::{Deserialize, Serialize};

/// One tree level: the feature to test and its threshold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Split {
    /// Index into the feature vector
    pub feature_idx: usize,

    /// Values greater than this go to the high side
    pub threshold: f64,
}

impl Split {
    pub fn new(feature_idx: usize, threshold: f64) -> Self {
        Self {
            feature_idx,
            threshold,
        }
    }

    #[inline]
    fn goes_high(&self, features: &[f64]) -> bool {
        features[self.feature_idx] > self.threshold
    }
}

/// A symmetric tree with per-level splits and `2^depth` leaves
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    /// Splits from the root level downward
    pub splits: Vec<Split>,

    /// Leaf values indexed by the split bit pattern
    pub leaves: Vec<f64>,

    /// Multiplier applied to the leaf value (the learning rate)
    pub weight: f64,
}

impl Tree {
    /// Create a new tree with the given splits, leaves and weight
    pub fn new(splits: Vec<Split>, leaves: Vec<f64>, weight: f64) -> Self {
        Self {
            splits,
            leaves,
            weight,
        }
    }

    /// Single-leaf tree with no splits
    pub fn constant(value: f64, weight: f64) -> Self {
        Self::new(Vec::new(), vec![value], weight)
    }

    pub fn depth(&self) -> usize {
        self.splits.len()
    }

    /// Leaf index reached by a feature vector
    pub fn leaf_index(&self, features: &[f64]) -> usize {
        self.splits
            .iter()
            .fold(0usize, |idx, split| (idx << 1) | split.goes_high(features) as usize)
    }

    /// Raw leaf value for a feature vector, before weighting
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        self.leaves[self.leaf_index(features)]
    }

    /// Weighted contribution of this tree to the ensemble score
    pub fn contribution(&self, features: &[f64]) -> f64 {
        self.weight * self.evaluate(features)
    }

    /// Validate tree structure against the expected feature count
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        let expected = 1usize
            .checked_shl(self.splits.len() as u32)
            .ok_or_else(|| format!("Tree depth {} is too large", self.splits.len()))?;
        if self.leaves.len() != expected {
            return Err(format!(
                "Tree of depth {} has {} leaves, expected {}",
                self.splits.len(),
                self.leaves.len(),
                expected
            ));
        }

        for (level, split) in self.splits.iter().enumerate() {
            if split.feature_idx >= feature_count {
                return Err(format!(
                    "Level {} splits on feature {} but model has {} features",
                    level, split.feature_idx, feature_count
                ));
            }
            if split.threshold.is_nan() {
                return Err(format!("Level {level} has a NaN threshold"));
            }
        }

        if let Some(pos) = self.leaves.iter().position(|v| !v.is_finite()) {
            return Err(format!("Leaf {pos} is not finite"));
        }

        Ok(())
    }
}
