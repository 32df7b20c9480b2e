//! Error types for the beymeta crate

use thiserror::Error;

/// Result type for beymeta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for beymeta operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Page fetching error
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
