// packages/recorder/src/utils/errors.rs
//! Error types for the heap timeseries recorder

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, RecorderError>;

/// Errors raised by the recorder and its collaborators
#[derive(Debug, Error)]
pub enum RecorderError {
    /// The destination file could not be created or truncated
    #[error("Failed to open timeseries file {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Handing buffered bytes to the OS failed
    #[error("Failed to write timeseries file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A record could not be encoded
    #[error("Failed to encode event record: {0}")]
    Encode(#[from] serde_json::Error),

    /// A line of a timeseries file could not be decoded
    #[error("Failed to decode event record at line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Reading a timeseries file failed
    #[error("Failed to read timeseries file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The periodic flush thread could not be spawned
    #[error("Failed to spawn flush thread: {0}")]
    SpawnFailed(#[source] io::Error),

    /// The periodic flush thread was started or stopped out of order
    #[error("Flush thread lifecycle violation: {0}")]
    Lifecycle(&'static str),

    /// The periodic flush thread panicked before it could be joined
    #[error("Flush thread panicked")]
    FlusherPanicked,

    /// The operation is not supported by this observer
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file could not be loaded
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// The destination has already been closed
    #[error("Timeseries file is closed")]
    Closed,
}

impl RecorderError {
    /// Whether the error indicates a broken contract rather than an I/O condition
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            RecorderError::Lifecycle(_) | RecorderError::Unsupported(_) | RecorderError::Closed
        )
    }
}
