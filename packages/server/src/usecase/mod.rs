//! UseCase layer: chat operations over the roster and the message pusher.
//!
//! The roster lock is held while a use case broadcasts, so every connection
//! receives membership snapshots in the order the roster changed.

mod connect_participant;
mod disconnect_participant;
mod error;
mod join_chat;
mod list_users;
mod send_message;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::Roster;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::ChatError;
pub use join_chat::JoinChatUseCase;
pub use list_users::ListUsersUseCase;
pub use send_message::SendMessageUseCase;

/// Roster shared by every use case of one server
pub type SharedRoster = Arc<Mutex<Roster>>;
