//! Domain types for the chat session.

use std::fmt;

use palaver_shared::protocol::WS_PATH;
use uuid::Uuid;

/// Host and port of a chat server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create a new endpoint
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// WebSocket URL of the chat endpoint (`ws://host:port/ws`)
    pub fn url(&self) -> String {
        format!("ws://{}{}", self, WS_PATH)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // IPv6 literals need brackets inside a URL authority
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Lifecycle of a session. Transitions only move forward:
/// `Idle → Connecting → Open → Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A chat message received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// `{sender}-{received_at}-{random}`; unique for practical purposes
    pub id: String,
    pub sender_name: String,
    pub text: String,
    /// Unix timestamp of arrival (milliseconds)
    pub received_at: i64,
}

impl ChatMessage {
    /// Create a message stamped with its arrival time and a fresh id
    pub fn new(sender_name: String, text: String, received_at: i64) -> Self {
        let id = format!(
            "{}-{}-{}",
            sender_name,
            received_at,
            Uuid::new_v4().simple()
        );
        Self {
            id,
            sender_name,
            text,
            received_at,
        }
    }
}

/// A user present in the chat, as listed by the latest snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveUser {
    pub name: String,
    /// First two characters of the name, upper-cased
    pub avatar_label: String,
}

impl ActiveUser {
    pub fn from_name(name: String) -> Self {
        let avatar_label = name.chars().take(2).collect::<String>().to_uppercase();
        Self { name, avatar_label }
    }

    /// Users are identified by name
    pub fn id(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        // テスト項目: エンドポイントから /ws の URL が組み立てられる
        // given (前提条件):
        let endpoint = Endpoint::new("127.0.0.1", 9090);

        // when (操作):
        let url = endpoint.url();

        // then (期待する結果):
        assert_eq!(url, "ws://127.0.0.1:9090/ws");
    }

    #[test]
    fn test_endpoint_url_with_ipv6_host() {
        // テスト項目: IPv6 ホストは角括弧で囲まれる
        // given (前提条件):
        let endpoint = Endpoint::new("::1", 8080);

        // when (操作):
        let url = endpoint.url();

        // then (期待する結果):
        assert_eq!(url, "ws://[::1]:8080/ws");
    }

    #[test]
    fn test_chat_message_id_contains_sender_and_time() {
        // テスト項目: メッセージ ID に送信者名と受信時刻が含まれる
        // given (前提条件):
        let received_at = 1672531200000;

        // when (操作):
        let message = ChatMessage::new("Alice".to_string(), "hi".to_string(), received_at);

        // then (期待する結果):
        assert!(message.id.starts_with("Alice-1672531200000-"));
        assert_eq!(message.sender_name, "Alice");
        assert_eq!(message.text, "hi");
    }

    #[test]
    fn test_chat_message_ids_are_unique_for_identical_payloads() {
        // テスト項目: 同じ内容・同じ時刻のメッセージでも ID が重複しない
        // given (前提条件):
        let received_at = 1000;

        // when (操作):
        let first = ChatMessage::new("Alice".to_string(), "hi".to_string(), received_at);
        let second = ChatMessage::new("Alice".to_string(), "hi".to_string(), received_at);

        // then (期待する結果):
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_avatar_label_takes_two_characters() {
        // テスト項目: アバターラベルは名前の先頭 2 文字の大文字になる
        // given (前提条件):
        let name = "alice".to_string();

        // when (操作):
        let user = ActiveUser::from_name(name);

        // then (期待する結果):
        assert_eq!(user.avatar_label, "AL");
        assert_eq!(user.id(), "alice");
    }

    #[test]
    fn test_avatar_label_single_character_name() {
        // テスト項目: 1 文字の名前はそのまま 1 文字のラベルになる
        // given (前提条件):
        let name = "b".to_string();

        // when (操作):
        let user = ActiveUser::from_name(name);

        // then (期待する結果):
        assert_eq!(user.avatar_label, "B");
    }

    #[test]
    fn test_avatar_label_counts_characters_not_bytes() {
        // テスト項目: マルチバイト文字でも文字単位でラベルが作られる
        // given (前提条件):
        let name = "éric".to_string();

        // when (操作):
        let user = ActiveUser::from_name(name);

        // then (期待する結果):
        assert_eq!(user.avatar_label, "ÉR");
    }

    #[test]
    fn test_connection_state_display() {
        // テスト項目: 接続状態が小文字の名前で表示される
        // given (前提条件):
        let state = ConnectionState::Connecting;

        // when (操作):
        let text = state.to_string();

        // then (期待する結果):
        assert_eq!(text, "connecting");
    }
}
