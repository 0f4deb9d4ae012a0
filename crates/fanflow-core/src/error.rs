//! Error types for the core primitives
use thiserror::Error;

/// Core pipeline errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// Image decoding error
    #[error("image error: {0}")]
    ImageError(#[from] image::ImageError),

    /// Frame sampling error
    #[error("sample error: {0}")]
    SampleError(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
