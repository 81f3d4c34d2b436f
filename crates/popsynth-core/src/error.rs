use thiserror::Error;

/// Core error type shared across popsynth crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem failure while reading or writing a dataset file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Failure inside the record writer.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// A path that cannot be used as a dataset target.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Convenience alias for results returned by popsynth crates.
pub type Result<T> = std::result::Result<T, Error>;
