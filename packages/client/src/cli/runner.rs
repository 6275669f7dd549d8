//! Client execution logic with reconnection support.

use std::time::Duration;

use crate::{domain::Endpoint, error::ClientError};

use super::{session::run_client_session, ui::spawn_line_reader};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the terminal chat client with reconnection logic.
///
/// Every attempt uses a fresh session; a closed session is never reopened.
pub async fn run_client(endpoint: Endpoint, name: String) -> Result<(), ClientError> {
    let mut input_rx = spawn_line_reader(name.trim());
    let mut failed_attempts = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            endpoint,
            name,
            failed_attempts + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&endpoint, &name, &mut input_rx).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) => {
                failed_attempts = count_failed_attempts(&e, failed_attempts);

                if !should_attempt_reconnect(&e, failed_attempts, MAX_RECONNECT_ATTEMPTS) {
                    tracing::error!("{}. Giving up after {} attempt(s).", e, failed_attempts);
                    return Err(e);
                }

                tracing::warn!("{}", e);
                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    failed_attempts + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}

/// Number of consecutive failed attempts after `error`.
///
/// A session that was open before it dropped starts a new streak.
fn count_failed_attempts(error: &ClientError, failed_attempts: u32) -> u32 {
    match error {
        ClientError::ConnectionLost(_) => 1,
        _ => failed_attempts + 1,
    }
}

/// Whether another attempt may help: never for an unusable name, otherwise
/// while the streak of failures stays below `max_attempts`.
fn should_attempt_reconnect(error: &ClientError, failed_attempts: u32, max_attempts: u32) -> bool {
    !matches!(error, ClientError::InvalidName(_)) && failed_attempts < max_attempts
}
