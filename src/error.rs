//! Common error types for metasift

use thiserror::Error;

/// Common result type for metasift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the scan/extract/analyze pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or record data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// CSV record table error (wraps csv::Error)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal pipeline error
    #[error("Internal error: {0}")]
    Internal(String),
}
