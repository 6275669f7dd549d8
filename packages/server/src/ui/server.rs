//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use palaver_shared::protocol::WS_PATH;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{health_check, list_users, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Build the router with every endpoint bound to `state`
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket エンドポイント
        .route(WS_PATH, get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/api/users", get(list_users))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the chat on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(Arc::new(AppState::default()));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Run the chat server
///
/// # Arguments
///
/// * `host` - The host address to bind to (e.g., "127.0.0.1")
/// * `port` - The port number to bind to (e.g., 8080)
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address or
/// if there's an error during server execution.
pub async fn run_server(host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Palaver server listening on {}", listener.local_addr()?);
    tracing::info!("Connect to: ws://{}{}", bind_addr, WS_PATH);
    tracing::info!("Press Ctrl+C to shutdown gracefully");

    serve(listener, shutdown_signal()).await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
