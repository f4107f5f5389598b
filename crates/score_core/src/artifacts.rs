//! Persisted training artifacts
//!
//! A trained run leaves three independent bincode files: the model, the
//! fitted scaler and the ordered feature-name list. They carry no shared
//! version tag, so they must be saved and loaded together as one set.
//! Files are overwritten in place; there is no multi-file atomicity.

use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{CoreError, Result};
use crate::gbdt::Model;
use crate::scaler::RobustScaler;

pub const MODEL_FILE: &str = "health_score_model.bin";
pub const SCALER_FILE: &str = "health_score_scaler.bin";
pub const FEATURES_FILE: &str = "feature_columns.bin";

/// Locations of the three artifact files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub features: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: dir.join(MODEL_FILE),
            scaler: dir.join(SCALER_FILE),
            features: dir.join(FEATURES_FILE),
        }
    }

    pub fn all(&self) -> [&Path; 3] {
        [&self.model, &self.scaler, &self.features]
    }
}

/// Model, scaler and feature order that were trained together
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSet {
    pub model: Model,
    pub scaler: RobustScaler,
    pub feature_names: Vec<String>,
}

impl ArtifactSet {
    pub fn new(model: Model, scaler: RobustScaler, feature_names: Vec<String>) -> Self {
        Self {
            model,
            scaler,
            feature_names,
        }
    }

    /// Write all three files, creating parent directories as needed
    pub fn save(&self, paths: &ArtifactPaths) -> Result<()> {
        write_blob(&paths.model, &self.model)?;
        write_blob(&paths.scaler, &self.scaler)?;
        write_blob(&paths.features, &self.feature_names)?;
        Ok(())
    }

    /// Read all three files and check they agree on the feature count
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let model: Model = read_blob(&paths.model)?;
        model.validate()?;
        let scaler: RobustScaler = read_blob(&paths.scaler)?;
        let feature_names: Vec<String> = read_blob(&paths.features)?;

        if scaler.n_features() != feature_names.len() || model.feature_count() != feature_names.len()
        {
            return Err(CoreError::ShapeMismatch(format!(
                "artifact set disagrees: model {} features, scaler {}, feature list {}",
                model.feature_count(),
                scaler.n_features(),
                feature_names.len()
            )));
        }

        Ok(Self::new(model, scaler, feature_names))
    }

    /// Scale an unscaled row (training column order) and score it
    pub fn predict_row(&self, raw: &[f64]) -> Result<f64> {
        let scaled = self.scaler.transform_row(raw)?;
        self.model.predict(&scaled)
    }
}

fn write_blob<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let bytes = bincode::serialize(value)?;
    fs::write(path, &bytes)?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn read_blob<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    Ok(bincode::deserialize(&bytes)?)
}
