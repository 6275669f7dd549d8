//! Terminal chat client.
//!
//! Connects to a chat server, joins under a display name and sends each line
//! typed on stdin. Incoming messages, join notices and the active-user list
//! are printed as they arrive. Reconnects on connection loss (max 5 attempts
//! with a 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin palaver-client -- --name Alice
//! cargo run --bin palaver-client -- -n Bob -H 127.0.0.1 -p 8080
//! ```

use clap::Parser;

use palaver_client::{Endpoint, cli::run_client};
use palaver_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "palaver-client")]
#[command(about = "WebSocket chat client", long_about = None)]
struct Args {
    /// Display name shown to other users
    #[arg(short = 'n', long)]
    name: String,

    /// Chat server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Chat server port
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run_client(Endpoint::new(args.host, args.port), args.name).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
