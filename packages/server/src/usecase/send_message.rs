//! UseCase: チャットメッセージの送信
//!
//! 送信者は接続から決まり、メッセージは送信者本人を含む全参加者に届く。

use std::sync::Arc;

use palaver_shared::protocol::ServerEnvelope;

use crate::domain::{ConnectionId, MessagePusher};

use super::{ChatError, SharedRoster};

pub struct SendMessageUseCase {
    roster: SharedRoster,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    pub fn new(roster: SharedRoster, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            roster,
            message_pusher,
        }
    }

    /// 送信者名を付けてメッセージを配信し、配信先の一覧を返す
    pub async fn execute(
        &self,
        id: ConnectionId,
        text: String,
    ) -> Result<Vec<ConnectionId>, ChatError> {
        let roster = self.roster.lock().await;
        let sender = roster.name_of(id)?.to_string();
        let envelope = ServerEnvelope::Message {
            sender,
            message: text,
        }
        .encode()?;

        let targets = roster.joined_connections();
        self.message_pusher
            .broadcast(targets.clone(), &envelope)
            .await?;
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockMessagePusher, PushError, Roster, RosterError};
    use tokio::sync::Mutex;

    fn roster_with(names: &[Option<&str>]) -> (SharedRoster, Vec<ConnectionId>) {
        let mut roster = Roster::new();
        let ids = names
            .iter()
            .map(|name| {
                let id = roster.add_connection();
                if let Some(name) = name {
                    roster.assign_name(id, name).unwrap();
                }
                id
            })
            .collect();
        (Arc::new(Mutex::new(roster)), ids)
    }

    #[tokio::test]
    async fn test_send_message_reaches_all_joined_including_sender() {
        // テスト項目: メッセージは送信者を含む全参加者に送信者名付きで届く
        // given (前提条件):
        let (roster, ids) = roster_with(&[Some("alice"), Some("bob"), None]);
        let expected_targets = vec![ids[0], ids[1]];
        let mut pusher = MockMessagePusher::new();
        let targets_for_mock = expected_targets.clone();
        pusher
            .expect_broadcast()
            .withf(move |targets, content| {
                *targets == targets_for_mock
                    && content == "{\"type\":\"message\",\"sender\":\"bob\",\"message\":\"hi\"}\n"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = SendMessageUseCase::new(roster, Arc::new(pusher));

        // when (操作):
        let result = usecase.execute(ids[1], "hi".to_string()).await;

        // then (期待する結果):
        assert_eq!(result.unwrap(), expected_targets);
    }

    #[tokio::test]
    async fn test_send_message_before_join_is_rejected() {
        // テスト項目: join 前の接続からのメッセージは配信されない
        // given (前提条件):
        let (roster, ids) = roster_with(&[Some("alice"), None]);
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase = SendMessageUseCase::new(roster, Arc::new(pusher));

        // when (操作):
        let result = usecase.execute(ids[1], "hello?".to_string()).await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ChatError::Roster(RosterError::NotJoined(_)))
        ));
    }

    #[tokio::test]
    async fn test_send_message_reports_broadcast_failure() {
        // テスト項目: 配信に失敗した場合はエラーが返る
        // given (前提条件):
        let (roster, ids) = roster_with(&[Some("alice")]);
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .returning(|_, _| Err(PushError::PushFailed("closed".to_string())));
        let usecase = SendMessageUseCase::new(roster, Arc::new(pusher));

        // when (操作):
        let result = usecase.execute(ids[0], "hi".to_string()).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ChatError::BroadcastFailed(_))));
    }
}
