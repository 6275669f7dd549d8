//! MessagePusher trait 定義
//!
//! UseCase 層はこの trait に依存し、WebSocket などの具体的な送信手段には依存しない。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::ConnectionId;

/// Outbound channel of one connection; each item is one text frame
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Errors raised while pushing frames to connections
#[derive(Debug, Error)]
pub enum PushError {
    #[error("Failed to push message: {0}")]
    PushFailed(String),
}

/// Delivers serialized envelopes to connected clients
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャネルを登録
    async fn register_client(&self, id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャネルを削除
    async fn unregister_client(&self, id: ConnectionId);

    /// 複数の接続に送信
    ///
    /// 一部の接続への失敗は許容し、宛先のどれにも届かなかった場合だけエラーを返す。
    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) -> Result<(), PushError>;
}
