//! Connection accept loop
//!
//! Accepts TCP connections and spawns one handler task per connection,
//! all sharing the same ChatHub.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;
use crate::handler::handle_connection;
use crate::hub::ChatHub;

/// Serve WebSocket clients from `listener` forever
pub async fn serve(listener: TcpListener, hub: Arc<ChatHub>, config: Arc<Config>) {
    info!("ChatHub serving on {}", config.ws_path);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let hub = Arc::clone(&hub);
                let config = Arc::clone(&config);

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, hub, config).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
