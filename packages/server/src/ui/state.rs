//! Shared application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    domain::{MessagePusher, Roster},
    infrastructure::WebSocketMessagePusher,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, JoinChatUseCase,
        ListUsersUseCase, SendMessageUseCase,
    },
};

/// Use cases shared by every handler
pub struct AppState {
    pub connect_participant_usecase: ConnectParticipantUseCase,
    pub join_chat_usecase: JoinChatUseCase,
    pub send_message_usecase: SendMessageUseCase,
    pub disconnect_participant_usecase: DisconnectParticipantUseCase,
    pub list_users_usecase: ListUsersUseCase,
}

impl AppState {
    /// Wire every use case to one roster and one message pusher
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        let roster = Arc::new(Mutex::new(Roster::new()));
        Self {
            connect_participant_usecase: ConnectParticipantUseCase::new(
                roster.clone(),
                message_pusher.clone(),
            ),
            join_chat_usecase: JoinChatUseCase::new(roster.clone(), message_pusher.clone()),
            send_message_usecase: SendMessageUseCase::new(roster.clone(), message_pusher.clone()),
            disconnect_participant_usecase: DisconnectParticipantUseCase::new(
                roster.clone(),
                message_pusher,
            ),
            list_users_usecase: ListUsersUseCase::new(roster),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(WebSocketMessagePusher::new()))
    }
}
