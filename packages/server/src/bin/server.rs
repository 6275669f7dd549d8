//! Palaver reference chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin palaver-server
//! cargo run --bin palaver-server -- --host 0.0.0.0 --port 3000
//! ```

use clap::Parser;
use palaver_server::run_server;
use palaver_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "palaver-server")]
#[command(about = "Palaver chat server with join, message and user list broadcast", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    if let Err(e) = run_server(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
