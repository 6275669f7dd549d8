//! One terminal chat session: prints session events and forwards input lines.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::{
    domain::Endpoint,
    error::ClientError,
    event::SessionEvent,
    session::ChatSession,
};

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

/// Input line that ends the client
pub const QUIT_COMMAND: &str = "/quit";

/// How long to wait for the server to confirm a close on exit
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Run a single session until the user exits or the connection is lost.
///
/// Returns `Ok(())` when the user asked to leave,
/// [`ClientError::ConnectionLost`] when an open connection dropped, and another
/// error when the connection could not be opened.
pub async fn run_client_session(
    endpoint: &Endpoint,
    name: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let session = ChatSession::new(endpoint.clone());
    let (closed_tx, mut closed_rx) = mpsc::unbounded_channel::<()>();

    let display_name = name.trim().to_string();
    let banner_endpoint = endpoint.clone();
    session.subscribe(move |event| {
        let text = match event {
            SessionEvent::Connected => {
                MessageFormatter::format_connected(&banner_endpoint, &display_name)
            }
            SessionEvent::Message(message) => {
                MessageFormatter::format_chat_message(message, &display_name)
            }
            SessionEvent::UserList(users) => {
                MessageFormatter::format_user_list(users, &display_name)
            }
            SessionEvent::UserJoined(joined) => MessageFormatter::format_user_joined(joined),
            SessionEvent::Error(error) => MessageFormatter::format_error(error),
            SessionEvent::Disconnected => {
                let _ = closed_tx.send(());
                MessageFormatter::format_disconnected()
            }
        };
        print!("{}", text);
        redisplay_prompt(&display_name);
    });

    session
        .connect(name)
        .await
        .map_err(|e| ClientError::from_session(e, name))?;

    loop {
        tokio::select! {
            line = input_rx.recv() => match line {
                Some(line) if line == QUIT_COMMAND => break,
                Some(line) => {
                    session.send_message(&line);
                }
                // Input closed (Ctrl+C / Ctrl+D)
                None => break,
            },
            _ = closed_rx.recv() => {
                return Err(ClientError::ConnectionLost(format!(
                    "disconnected from {}",
                    endpoint
                )));
            }
        }
    }

    tracing::info!("Leaving chat");
    session.disconnect();
    if tokio::time::timeout(CLOSE_TIMEOUT, closed_rx.recv())
        .await
        .is_err()
    {
        tracing::warn!("Server did not confirm the close within {:?}", CLOSE_TIMEOUT);
    }

    Ok(())
}
