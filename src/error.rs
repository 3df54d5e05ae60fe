//! Error types for filedrop.

use thiserror::Error;

/// Common error type for filedrop.
#[derive(Error, Debug)]
pub enum FiledropError {
    /// Folder argument is neither `uploads` nor `downloads`.
    #[error("invalid folder: {0} (expected uploads or downloads)")]
    InvalidFolder(String),

    /// Filename is empty, hidden, or looks like a path after sanitization.
    #[error("invalid filename: {0}")]
    InvalidName(String),

    /// A requested path escapes the folder it was resolved against.
    #[error("invalid file path: {0}")]
    PathTraversal(String),

    /// Content exceeds the configured upload limit.
    #[error("file too large (max {} MB)", .limit / 1024 / 1024)]
    PayloadTooLarge {
        /// Limit in bytes.
        limit: u64,
    },

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Underlying filesystem failure.
    #[error("storage I/O error: {0}")]
    StorageIo(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Push/pull client error.
    #[error("client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for FiledropError {
    fn from(e: reqwest::Error) -> Self {
        FiledropError::Client(e.to_string())
    }
}

impl From<url::ParseError> for FiledropError {
    fn from(e: url::ParseError) -> Self {
        FiledropError::Client(format!("invalid server URL: {e}"))
    }
}

/// Result type alias for filedrop operations.
pub type Result<T> = std::result::Result<T, FiledropError>;
