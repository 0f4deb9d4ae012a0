//! Error types for device control and streaming
use thiserror::Error;

/// Control-side errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Device HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The device does not advertise the requested output endpoint
    #[error("endpoint not found: {0}")]
    EndpointNotFound(String),

    /// Malformed topology descriptor
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
