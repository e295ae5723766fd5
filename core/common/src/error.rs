//! Common error types for Cardbox.

use thiserror::Error;

/// Top-level error type for Cardbox operations.
#[derive(Debug, Error)]
pub enum Error {
    /// API method name does not match the method grammar.
    #[error("API method has an unexpected format: {0}")]
    InvalidMethod(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network-level failure: connection, TLS, or reading the body.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote service answered with a non-success status.
    ///
    /// Status and body are passed through as received.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body, lossily decoded as UTF-8.
        body: String,
    },

    /// Capability exists in the API surface but is not implemented.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether this error was raised by argument validation, before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidMethod(_) | Error::InvalidInput(_))
    }

    /// HTTP status of a remote failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
