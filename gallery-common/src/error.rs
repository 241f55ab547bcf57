//! Common error types for the gallery service

use thiserror::Error;

/// Common result type for gallery operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the gallery workspace
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata document parse/serialize error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource conflicts with an existing one (e.g. duplicate name)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Cloud storage upload/destroy failure
    #[error("Upload error: {0}")]
    Upload(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
