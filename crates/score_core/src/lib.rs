//! Health-score model core
//!
//! Everything needed to turn per-100g nutrition facts into a predicted
//! health score, shared by the trainer and any serving layer.
//!
//! Modules:
//! - `table`: column-major numeric table
//! - `features`: derived nutrition ratio features
//! - `scaler`: median/IQR robust scaler
//! - `gbdt`: symmetric-tree GBDT model and inference
//! - `artifacts`: saving and loading the model, scaler and feature order
//! - `serialization`: canonical JSON and model hashing
//! - `rating`: health rating bands

pub mod artifacts;
pub mod errors;
pub mod features;
pub mod gbdt;
pub mod rating;
pub mod scaler;
pub mod serialization;
pub mod table;

pub use artifacts::{ArtifactPaths, ArtifactSet};
pub use errors::{CoreError, Result};
pub use features::{
    engineer_features, EngineeredFeatures, NutritionFacts, DERIVED_COLUMNS, TARGET,
};
pub use gbdt::{Model, ModelMetadata, Split, Tree};
pub use rating::HealthRating;
pub use scaler::{ColumnScale, RobustScaler};
pub use table::Table;

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
