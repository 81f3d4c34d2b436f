use thiserror::Error;

/// Errors emitted by the validation engine.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    #[error("validation failed with {0} failing check(s)")]
    Failed(u64),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] popsynth_core::Error),
}
