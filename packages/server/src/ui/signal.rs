//! Shutdown signal handling.

/// Resolves when Ctrl+C is received
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, closing server"),
        Err(e) => {
            tracing::error!("Failed to listen for the shutdown signal: {}", e);
            // Without a signal handler, keep serving until the process is killed
            std::future::pending::<()>().await;
        }
    }
}
