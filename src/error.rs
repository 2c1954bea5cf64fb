//! Error types for depot.

use thiserror::Error;

/// Common error type for depot operations.
#[derive(Error, Debug)]
pub enum DepotError {
    /// Referenced stored name has no backing file.
    #[error("{0} not found")]
    NotFound(String),

    /// A client-supplied name is not usable as a stored name
    /// (empty, path separators, `.`/`..`).
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Malformed request payload (e.g. batch body without a `files` array).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Malformed multipart body or failed body read.
    #[error("transport error: {0}")]
    Transport(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip archive assembly error.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for depot operations.
pub type Result<T> = std::result::Result<T, DepotError>;
