//! Trainer configuration
//!
//! `TrainerConfig::default()` is the fixed reference run: the food CSV in the
//! working directory, an 80/20 split with seed 42, the default boosting
//! parameters, 3-fold CV and artifacts written next to the input. A TOML
//! file may override any subset of fields; CLI flags override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::TrainerError;
use crate::trainer::{TrainingParams, MAX_BORDER_COUNT, MAX_DEPTH};
use healthscore_core::features::TARGET;

/// Complete trainer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrainerConfig {
    pub data: DataConfig,
    pub split: SplitConfig,
    pub model: TrainingParams,
    pub cross_validation: CvConfig,
    pub output: OutputConfig,
}

/// Input dataset location and target column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub input: PathBuf,
    pub target_column: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("Indian_Packaged_Food.csv"),
            target_column: TARGET.to_string(),
        }
    }
}

/// Train/test partition settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of rows held out for testing
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvConfig {
    pub folds: usize,
}

impl Default for CvConfig {
    fn default() -> Self {
        Self { folds: 3 }
    }
}

/// Where the three artifact files are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

impl TrainerConfig {
    /// Load configuration from a TOML file; absent fields keep their defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            TrainerError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, TrainerError> {
        toml::from_str(content)
            .map_err(|e| TrainerError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), TrainerError> {
        let fraction = self.split.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(TrainerError::Config(format!(
                "split.test_fraction must be in (0, 1), got {}",
                fraction
            )));
        }
        if self.cross_validation.folds < 2 {
            return Err(TrainerError::Config(format!(
                "cross_validation.folds must be at least 2, got {}",
                self.cross_validation.folds
            )));
        }

        let model = &self.model;
        if model.iterations == 0 {
            return Err(TrainerError::Config("model.iterations must be positive".into()));
        }
        if !(model.learning_rate.is_finite() && model.learning_rate > 0.0) {
            return Err(TrainerError::Config(format!(
                "model.learning_rate must be positive, got {}",
                model.learning_rate
            )));
        }
        if model.depth == 0 || model.depth > MAX_DEPTH {
            return Err(TrainerError::Config(format!(
                "model.depth must be in 1..={}, got {}",
                MAX_DEPTH, model.depth
            )));
        }
        if model.l2_leaf_reg.is_nan() || model.l2_leaf_reg < 0.0 {
            return Err(TrainerError::Config(format!(
                "model.l2_leaf_reg must be non-negative, got {}",
                model.l2_leaf_reg
            )));
        }
        if model.border_count == 0 || model.border_count > MAX_BORDER_COUNT {
            return Err(TrainerError::Config(format!(
                "model.border_count must be in 1..={}, got {}",
                MAX_BORDER_COUNT, model.border_count
            )));
        }
        if model.bagging_temperature.is_nan() || model.bagging_temperature < 0.0 {
            return Err(TrainerError::Config(format!(
                "model.bagging_temperature must be non-negative, got {}",
                model.bagging_temperature
            )));
        }
        Ok(())
    }
}
