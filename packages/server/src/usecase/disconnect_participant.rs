//! UseCase: 接続の切断
//!
//! 参加済みの接続が切れた場合だけ、残りの参加者へユーザー一覧を配信する。

use std::sync::Arc;

use palaver_shared::protocol::ServerEnvelope;

use crate::domain::{ConnectionId, MessagePusher};

use super::{ChatError, SharedRoster};

pub struct DisconnectParticipantUseCase {
    roster: SharedRoster,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    pub fn new(roster: SharedRoster, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            roster,
            message_pusher,
        }
    }

    /// 接続を名簿と MessagePusher から削除する
    ///
    /// 戻り値は切断した接続の名前（未参加なら `None`）。
    pub async fn execute(&self, id: ConnectionId) -> Result<Option<String>, ChatError> {
        let mut roster = self.roster.lock().await;
        self.message_pusher.unregister_client(id).await;
        let name = roster.remove_connection(id)?;

        if name.is_some() {
            let user_list = ServerEnvelope::UserList {
                message: roster.user_names(),
            }
            .encode()?;
            self.message_pusher
                .broadcast(roster.joined_connections(), &user_list)
                .await?;
        }

        Ok(name)
    }
}
