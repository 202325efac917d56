//! Error types for the teeter crate

use thiserror::Error;

/// Main error type for the teeter crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid state key '{key}' (expected format: 'zone_velocity_danger')")]
    InvalidStateKey { key: String },

    #[error("unknown action '{name}'. Expected one of: MoveLeft, MoveRight, Jump, None")]
    InvalidAction { name: String },

    #[error("invalid side '{value}' (expected '1' or '2')")]
    InvalidSide { value: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshotVersion { found: u32, expected: u32 },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
