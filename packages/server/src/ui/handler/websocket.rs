//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use palaver_shared::protocol::{ClientEnvelope, split_segments};
use tokio::sync::mpsc;

use crate::{domain::ConnectionId, ui::state::AppState};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that forwards frames queued for this connection to its socket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let id = state.connect_participant_usecase.execute(tx).await;
    tracing::info!("Connection {} opened", id);

    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on connection {}: {}", id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => handle_frame(&state_clone, id, text.as_str()).await,
                // Keep reading so the close reply is flushed before the stream ends
                Message::Close(_) => tracing::info!("Connection {} requested close", id),
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    match state.disconnect_participant_usecase.execute(id).await {
        Ok(Some(name)) => tracing::info!("'{}' left (connection {})", name, id),
        Ok(None) => tracing::info!("Connection {} closed before joining", id),
        Err(e) => tracing::warn!("Failed to disconnect connection {}: {}", id, e),
    }
}

/// Decode every envelope of one text frame and apply it in order
async fn handle_frame(state: &AppState, id: ConnectionId, frame: &str) {
    for segment in split_segments(frame) {
        let envelope = match ClientEnvelope::decode(segment) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Dropping envelope from connection {}: {}", id, e);
                continue;
            }
        };

        match envelope {
            ClientEnvelope::Join(name) => match state.join_chat_usecase.execute(id, &name).await {
                Ok(name) => tracing::info!("'{}' joined (connection {})", name, id),
                Err(e) => tracing::warn!("Ignoring join from connection {}: {}", id, e),
            },
            ClientEnvelope::Message(text) => {
                if let Err(e) = state.send_message_usecase.execute(id, text).await {
                    tracing::warn!("Ignoring message from connection {}: {}", id, e);
                }
            }
        }
    }
}
