//! WebSocket を使った MessagePusher 実装
//!
//! WebSocket の受け付けと分割は UI 層で行い、ここでは各接続の送信チャネルを
//! 保持してフレームを流し込むだけを担当する。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePusher, PushError, PusherChannel};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続番号と、その接続の送信タスクへつながるチャネル
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, id: ConnectionId, sender: PusherChannel) {
        self.clients.lock().await.insert(id, sender);
        tracing::debug!("Connection {} registered to MessagePusher", id);
    }

    async fn unregister_client(&self, id: ConnectionId) {
        self.clients.lock().await.remove(&id);
        tracing::debug!("Connection {} unregistered from MessagePusher", id);
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) -> Result<(), PushError> {
        let clients = self.clients.lock().await;
        let target_count = targets.len();
        let mut delivered = 0;

        for target in targets {
            match clients.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => match sender.send(content.to_string()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!("Failed to push frame to connection {}: {}", target, e);
                    }
                },
                None => {
                    tracing::warn!("Connection {} not found during broadcast, skipping", target);
                }
            }
        }

        if target_count > 0 && delivered == 0 {
            return Err(PushError::PushFailed(format!(
                "none of {} connections reachable",
                target_count
            )));
        }
        tracing::debug!("Broadcast frame to {}/{} connections", delivered, target_count);
        Ok(())
    }
}
