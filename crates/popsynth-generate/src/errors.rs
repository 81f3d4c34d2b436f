use thiserror::Error;

use popsynth_config::ValidationReport;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Requested counts are infeasible; nothing was generated or written.
    #[error("configuration error: {0}")]
    Configuration(ValidationReport),
    /// A direct generator call received inputs outside its contract.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("output error: {0}")]
    Output(#[from] popsynth_core::Error),
}
