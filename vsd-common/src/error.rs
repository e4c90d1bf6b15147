//! Common error types for VSD

use thiserror::Error;

/// Common result type for VSD operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the VSD services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted in the current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Frame classifier failure
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Frame capture failure
    #[error("Capture error: {0}")]
    Capture(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for failures that spoil a single tick or work item but must not
    /// terminate the owning loop.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Classifier(_) | Error::Capture(_) | Error::Io(_))
    }
}
