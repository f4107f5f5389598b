//! Error types for the health-score core

use thiserror::Error;

/// Errors that can occur in the core crate
#[derive(Error, Debug)]
pub enum CoreError {
    /// A named column is absent from the table
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Column lengths or widths disagree
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Scaler used before fitting or fitted on nothing
    #[error("Scaler error: {0}")]
    Scaler(String),

    /// Model structure failed validation
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Binary artifact encoding error
    #[error("Artifact encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
