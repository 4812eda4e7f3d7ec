//! Common error types for emosense

use thiserror::Error;

/// Common result type for emosense operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the emosense binaries
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP server or forwarding error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
