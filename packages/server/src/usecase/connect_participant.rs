//! UseCase: 接続の受け付け

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel};

use super::SharedRoster;

/// 新しい WebSocket 接続を名簿と MessagePusher に登録する
pub struct ConnectParticipantUseCase {
    roster: SharedRoster,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    pub fn new(roster: SharedRoster, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            roster,
            message_pusher,
        }
    }

    /// 接続を登録し、割り当てた接続番号を返す
    ///
    /// 名前は後から届く `join` で決まるため、この時点では誰にも通知しない。
    pub async fn execute(&self, sender: PusherChannel) -> ConnectionId {
        let mut roster = self.roster.lock().await;
        let id = roster.add_connection();
        self.message_pusher.register_client(id, sender).await;
        tracing::debug!(
            "Connection {} registered ({} open connections)",
            id,
            roster.connection_count()
        );
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockMessagePusher, Roster};
    use tokio::sync::{Mutex, mpsc};

    #[tokio::test]
    async fn test_connect_registers_channel_without_broadcast() {
        // テスト項目: 接続時は送信チャネルの登録だけが行われ、通知は送られない
        // given (前提条件):
        let roster = Arc::new(Mutex::new(Roster::new()));
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_register_client()
            .withf(|id, _| *id == 1)
            .times(1)
            .return_const(());
        pusher.expect_broadcast().never();
        let usecase = ConnectParticipantUseCase::new(roster.clone(), Arc::new(pusher));
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let id = usecase.execute(tx).await;

        // then (期待する結果):
        assert_eq!(id, 1);
        let roster = roster.lock().await;
        assert_eq!(roster.connection_count(), 1);
        assert!(roster.user_names().is_empty());
    }
}
