//! UseCase: チャットへの参加（join）
//!
//! 最初の join で接続に名前が付き、他の参加者には参加通知、
//! 全参加者（本人を含む）には最新のユーザー一覧が届く。

use std::sync::Arc;

use palaver_shared::protocol::ServerEnvelope;

use crate::domain::{ConnectionId, MessagePusher};

use super::{ChatError, SharedRoster};

pub struct JoinChatUseCase {
    roster: SharedRoster,
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinChatUseCase {
    pub fn new(roster: SharedRoster, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            roster,
            message_pusher,
        }
    }

    /// 接続に名前を付け、参加通知とユーザー一覧を配信する
    ///
    /// 戻り値は登録された（空白を除いた）名前。
    pub async fn execute(&self, id: ConnectionId, name: &str) -> Result<String, ChatError> {
        let mut roster = self.roster.lock().await;
        let name = roster.assign_name(id, name)?;

        let joined = ServerEnvelope::Join {
            user_name: name.clone(),
        }
        .encode()?;
        let user_list = ServerEnvelope::UserList {
            message: roster.user_names(),
        }
        .encode()?;

        self.message_pusher
            .broadcast(roster.joined_connections_except(id), &joined)
            .await?;
        self.message_pusher
            .broadcast(roster.joined_connections(), &user_list)
            .await?;

        Ok(name)
    }
}
