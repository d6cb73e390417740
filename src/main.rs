//! chatik - Entry Point
//!
//! Loads the config, starts the TCP listener and serves the chat room.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chatik::{serve, ChatHub, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Bind address from command line, if given
    let config = Config::load(env::args().nth(1))?;

    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chatik=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    // Start TCP listener
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "WebSocket chat listening on ws://{}{}",
        config.bind_addr, config.ws_path
    );

    let hub = Arc::new(ChatHub::from_config(&config));
    serve(listener, hub, Arc::new(config)).await;

    Ok(())
}
