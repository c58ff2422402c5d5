//! Common error types for gbmatch

use thiserror::Error;

/// Common result type for gbmatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the reconciliation library and the command-line front end
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input file (identifier list, exception table)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid user input or argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
