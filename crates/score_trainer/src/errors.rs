use thiserror::Error;

/// Errors returned by the health-score trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("training error: {0}")]
    Training(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error("persistence error: {0}")]
    Persist(String),
}
