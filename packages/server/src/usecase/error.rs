//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{PushError, RosterError};

/// Errors raised by the join, send and disconnect use cases
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("Failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to broadcast: {0}")]
    BroadcastFailed(#[from] PushError),
}
