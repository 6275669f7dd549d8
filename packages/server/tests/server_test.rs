//! End-to-end tests for the Palaver server over real sockets.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use palaver_shared::protocol::ServerEnvelope;
use tokio::{net::TcpListener, sync::oneshot, time::timeout};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

const WAIT: Duration = Duration::from_secs(3);
const QUIET: Duration = Duration::from_millis(200);

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

struct TestServer {
    port: u16,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(palaver_server::serve(listener, async move {
            let _ = shutdown_rx.await;
        }));
        Self {
            port,
            _shutdown: shutdown,
        }
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    async fn connect(&self) -> Client {
        let url = format!("ws://127.0.0.1:{}/ws", self.port);
        let (client, _) = connect_async(url).await.unwrap();
        client
    }
}

async fn send(client: &mut Client, frame: &str) {
    client.send(Message::Text(frame.into())).await.unwrap();
}

async fn join(client: &mut Client, name: &str) {
    send(client, &format!("{{\"type\":\"join\",\"data\":\"{}\"}}\n", name)).await;
}

async fn recv(client: &mut Client) -> ServerEnvelope {
    loop {
        let frame = timeout(WAIT, client.next())
            .await
            .expect("timed out waiting for a server frame")
            .expect("connection closed")
            .unwrap();
        if let Message::Text(text) = frame {
            assert!(text.as_str().ends_with('\n'), "frame is not newline-terminated");
            return ServerEnvelope::decode(text.as_str().trim()).unwrap();
        }
    }
}

async fn assert_silent(client: &mut Client) {
    if let Ok(Some(Ok(frame))) = timeout(QUIET, client.next()).await {
        panic!("unexpected frame: {:?}", frame);
    }
}

fn user_list(names: &[&str]) -> ServerEnvelope {
    ServerEnvelope::UserList {
        message: names.iter().map(|name| name.to_string()).collect(),
    }
}

async fn get_users(server: &TestServer) -> Vec<String> {
    let body: serde_json::Value = reqwest::get(server.http_url("/api/users"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    serde_json::from_value(body["users"].clone()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが 200 と {"status":"ok"} を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = reqwest::get(server.http_url("/api/health")).await.unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_join_sequence_notifies_and_lists_users() {
    // テスト項目: join ごとに参加通知と全員分のユーザー一覧が配信される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    // when (操作):
    join(&mut alice, "alice").await;
    let alice_first = recv(&mut alice).await;
    join(&mut bob, "bob").await;

    // then (期待する結果):
    assert_eq!(alice_first, user_list(&["alice"]));
    assert_eq!(
        recv(&mut alice).await,
        ServerEnvelope::Join {
            user_name: "bob".to_string()
        }
    );
    assert_eq!(recv(&mut alice).await, user_list(&["alice", "bob"]));
    assert_eq!(recv(&mut bob).await, user_list(&["alice", "bob"]));
    assert_silent(&mut bob).await;
    assert_eq!(get_users(&server).await, vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_message_is_echoed_to_everyone_with_sender() {
    // テスト項目: メッセージは送信者名付きで送信者を含む全参加者に届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    join(&mut alice, "alice").await;
    recv(&mut alice).await;
    join(&mut bob, "bob").await;
    recv(&mut alice).await;
    recv(&mut alice).await;
    recv(&mut bob).await;

    // when (操作):
    send(&mut bob, "{\"type\":\"message\",\"data\":\"hi all\"}\n").await;

    // then (期待する結果):
    let expected = ServerEnvelope::Message {
        sender: "bob".to_string(),
        message: "hi all".to_string(),
    };
    assert_eq!(recv(&mut alice).await, expected);
    assert_eq!(recv(&mut bob).await, expected);
}

#[tokio::test]
async fn test_unjoined_messages_and_bad_frames_are_dropped() {
    // テスト項目: join 前のメッセージと不正なフレームは配信されず、接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut lurker = server.connect().await;
    join(&mut alice, "alice").await;
    recv(&mut alice).await;

    // when (操作):
    send(&mut lurker, "{\"type\":\"message\",\"data\":\"psst\"}\n").await;
    send(&mut lurker, "not json\n{\"type\":\"shout\",\"data\":\"x\"}\n").await;
    send(
        &mut alice,
        "{garbage}\n{\"type\":\"message\",\"data\":\"still here\"}\n",
    )
    .await;

    // then (期待する結果):
    assert_eq!(
        recv(&mut alice).await,
        ServerEnvelope::Message {
            sender: "alice".to_string(),
            message: "still here".to_string(),
        }
    );
    assert_silent(&mut lurker).await;
    assert_eq!(get_users(&server).await, vec!["alice"]);
}

#[tokio::test]
async fn test_second_join_does_not_rename() {
    // テスト項目: 同じ接続からの 2 回目の join は無視される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    join(&mut alice, "alice").await;
    recv(&mut alice).await;

    // when (操作):
    join(&mut alice, "mallory").await;

    // then (期待する結果):
    assert_silent(&mut alice).await;
    assert_eq!(get_users(&server).await, vec!["alice"]);
}

#[tokio::test]
async fn test_leaving_user_triggers_user_list() {
    // テスト項目: 参加者が切断すると残りの参加者に最新のユーザー一覧が届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    join(&mut alice, "alice").await;
    recv(&mut alice).await;
    join(&mut bob, "bob").await;
    recv(&mut alice).await;
    recv(&mut alice).await;

    // when (操作):
    bob.close(None).await.unwrap();

    // then (期待する結果):
    assert_eq!(recv(&mut alice).await, user_list(&["alice"]));
    assert_eq!(get_users(&server).await, vec!["alice"]);
}
