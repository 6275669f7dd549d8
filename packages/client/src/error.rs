//! Error types for the chat session and the terminal client.

use thiserror::Error;

use crate::domain::ConnectionState;

/// Session-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Display name is empty after trimming
    #[error("Display name must not be empty")]
    InvalidName,

    /// Operation is not valid in the current connection state
    #[error("Cannot {operation} while the session is {state}")]
    InvalidOperation {
        operation: &'static str,
        state: ConnectionState,
    },

    /// The transport failed to open or failed while open
    #[error("Connection error: {0}")]
    Connection(String),

    /// An outgoing envelope could not be serialized
    #[error("Failed to encode envelope: {0}")]
    Encode(String),
}

/// Errors surfaced by the terminal client runner
#[derive(Debug, Error)]
pub enum ClientError {
    /// The chosen display name cannot be used
    #[error("Invalid display name '{0}'")]
    InvalidName(String),

    /// The connection could not be opened
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An open connection was lost
    #[error("Connection lost: {0}")]
    ConnectionLost(String),
}

impl ClientError {
    /// Map a failed `connect` to a runner error
    pub fn from_session(error: SessionError, name: &str) -> Self {
        match error {
            SessionError::InvalidName => Self::InvalidName(name.to_string()),
            other => Self::ConnectionError(other.to_string()),
        }
    }
}
