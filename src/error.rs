//! Error types for worksheet synthesis and rendering

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a worksheet
///
/// Only engine, request and render failures reach callers. Missing assets,
/// failed background removal and failed disposal are absorbed where they
/// happen and only show up in the logs.
#[derive(Error, Debug)]
pub enum Error {
    /// The rendering engine could not be launched or reached
    #[error("Rendering engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The requested worksheet type is not registered
    #[error("Unknown worksheet type: {0}")]
    UnknownWorksheetType(String),

    /// The request carried a value the synthesizer cannot honour
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to load a document into a canvas
    #[error("Failed to load document: {0}")]
    LoadError(String),

    /// Failed to render content
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Filesystem failure while writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    CdpError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error is the caller's fault rather than the pipeline's
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::UnknownWorksheetType(_) | Error::InvalidRequest(_))
    }
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::CdpError(err.to_string())
    }
}
