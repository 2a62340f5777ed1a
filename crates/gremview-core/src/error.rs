//! Error types for gremview-core.
//!
//! The variants mirror the failure classes a query request can hit: bad
//! client input, an unreachable backend, a fault raised by the backend while
//! executing, and the transport/timeout/cancellation conditions around them.
//! Best-effort stages never surface these to the caller; they record them in
//! the execution log instead.

use std::time::Duration;

/// Errors that can occur while executing a Gremview request.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The request was missing required input or carried malformed input.
    #[error("{message}")]
    InvalidInput {
        /// Human-readable description of the problem
        message: String,
    },

    /// The backend could not be reached or the session could not be opened.
    #[error("Connection to {endpoint} failed: {message}")]
    Connection {
        /// Endpoint that was being contacted
        endpoint: String,
        /// What went wrong
        message: String,
    },

    /// The backend accepted the query but raised a fault while running it.
    #[error("Query execution failed: {message}")]
    Execution {
        /// Backend status code, if one was reported
        code: Option<u16>,
        /// Backend error message
        message: String,
    },

    /// The backend sent a frame that could not be understood.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A backend call did not complete within its time budget.
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        /// The operation that timed out
        operation: String,
        /// Timeout duration in seconds
        seconds: u64,
    },

    /// The inbound request went away before the query completed.
    #[error("Request cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },
}

/// Convenience `Result` type alias for Gremview operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput { .. })
    }

    /// Creates a new input error.
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a new connection error.
    pub fn connection<E, M>(endpoint: E, message: M) -> Self
    where
        E: Into<String>,
        M: Into<String>,
    {
        Error::Connection {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a new execution error.
    pub fn execution<S: Into<String>>(code: Option<u16>, message: S) -> Self {
        Error::Execution {
            code,
            message: message.into(),
        }
    }

    /// Creates a new protocol error.
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Error::Protocol(message.into())
    }

    /// Creates a new timeout error for the named operation.
    pub fn timeout<S: Into<String>>(operation: S, limit: Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            seconds: limit.as_secs(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}
