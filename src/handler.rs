//! WebSocket connection handler
//!
//! Drives one client connection: WebSocket handshake, session resolution,
//! and the read/write tasks between the socket and the ChatHub. Whatever
//! ends the connection, the hub's `leave` runs exactly once for it.

use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{self, Duration, Instant};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, error, info, warn};

use crate::client::{Client, Outbox};
use crate::config::Config;
use crate::connection::{CloseReason, Connection};
use crate::error::AppError;
use crate::hub::ChatHub;
use crate::session;
use crate::types::SessionId;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsSource = SplitStream<WebSocketStream<TcpStream>>;

/// Upper bound on the closing handshake of a connection
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake, resolves the session, registers with
/// the hub and pumps frames until either side goes away.
pub async fn handle_connection(
    stream: TcpStream,
    hub: Arc<ChatHub>,
    config: Arc<Config>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake, resolving the session from the upgrade request
    let mut resolved = None;
    let ws_stream = tokio_tungstenite::accept_hdr_async(
        stream,
        |request: &Request, mut response: Response| -> Result<Response, ErrorResponse> {
            if request.uri().path() != config.ws_path {
                debug!("Rejecting upgrade on {}", request.uri().path());
                let mut not_found = ErrorResponse::new(Some("Not found".to_string()));
                *not_found.status_mut() = StatusCode::NOT_FOUND;
                return Err(not_found);
            }
            resolved = session::resolve(request, &mut response, config.issue_sessions);
            Ok(response)
        },
    )
    .await?;
    let (mut ws_sender, ws_receiver) = ws_stream.split();

    let Some(session) = resolved else {
        warn!("Connection from {} has no session, closing", peer_addr);
        let frame = Message::Close(Some(close_frame(CloseReason::PolicyViolation)));
        if time::timeout(CLOSE_TIMEOUT, ws_sender.send(frame)).await.is_err() {
            debug!("Close frame to {} timed out", peer_addr);
        }
        return Ok(());
    };

    // Outbound handle registered with the hub
    let (client, outbox) = Client::new(config.outbound_buffer);
    let client = Arc::new(client);
    let connection_id = client.id();
    info!(
        "Connection {} for session {} from {}",
        connection_id, session, peer_addr
    );

    // Spawn write task (hub -> WebSocket) before joining so history replay
    // drains while it is being sent
    let mut write_task = tokio::spawn(write_loop(ws_sender, outbox, config.ping_interval()));

    hub.join(&session, client.clone()).await;

    // Spawn read task (WebSocket -> hub)
    let mut read_task = tokio::spawn(read_loop(ws_receiver, Arc::clone(&hub), session.clone()));

    // Wait for either task to complete, then stop the other
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", connection_id);
            write_task.abort();
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", connection_id);
            read_task.abort();
        }
    }

    hub.leave(&session, connection_id).await;

    info!("Connection {} disconnected", connection_id);

    Ok(())
}

/// Forward inbound text frames to the hub
async fn read_loop(mut ws_receiver: WsSource, hub: Arc<ChatHub>, session: SessionId) {
    while let Some(msg_result) = ws_receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                hub.dispatch(&session, &text).await;
            }
            Ok(Message::Close(_)) => {
                debug!("Session {} sent close frame", session);
                break;
            }
            Ok(Message::Ping(_)) => {
                // Pong is handled automatically by tungstenite
                debug!("Ping from {}", session);
            }
            Ok(Message::Pong(_)) => {
                debug!("Pong from {}", session);
            }
            Ok(_) => {
                // Binary or other message types - ignore
            }
            Err(e) => {
                error!("WebSocket error for {}: {}", session, e);
                break;
            }
        }
    }
    debug!("Read task ended for {}", session);
}

/// Forward hub output to the socket and keep the connection alive
///
/// Ends when the hub closes the connection, even if a write to the socket
/// is stuck on a peer that stopped reading.
async fn write_loop(mut ws_sender: WsSink, mut outbox: Outbox, ping_period: Duration) {
    let mut ping = time::interval_at(Instant::now() + ping_period, ping_period);

    loop {
        tokio::select! {
            text = outbox.messages.recv() => {
                let Some(text) = text else {
                    break;
                };
                if !send_or_close(&mut ws_sender, &mut outbox.close, Message::Text(text)).await {
                    break;
                }
            }
            changed = outbox.close.changed() => {
                if changed.is_err() {
                    break;
                }
                let reason = *outbox.close.borrow_and_update();
                if let Some(reason) = reason {
                    debug!("Closing connection: {:?}", reason);
                    let frame = Message::Close(Some(close_frame(reason)));
                    if time::timeout(CLOSE_TIMEOUT, ws_sender.send(frame)).await.is_err() {
                        debug!("Close frame timed out");
                    }
                    break;
                }
            }
            _ = ping.tick() => {
                if !send_or_close(&mut ws_sender, &mut outbox.close, Message::Ping(Vec::new())).await {
                    break;
                }
            }
        }
    }
    debug!("Write task ended");

    let _ = time::timeout(CLOSE_TIMEOUT, ws_sender.close()).await;
}

/// Write one frame unless the hub asks to close first
///
/// Returns false when the write task should stop.
async fn send_or_close(
    ws_sender: &mut WsSink,
    close: &mut watch::Receiver<Option<CloseReason>>,
    msg: Message,
) -> bool {
    tokio::select! {
        result = ws_sender.send(msg) => {
            if let Err(e) = result {
                debug!("WebSocket send failed, ending write task: {}", e);
                return false;
            }
            true
        }
        _ = close.wait_for(Option::is_some) => {
            debug!("Close requested during a blocked send");
            false
        }
    }
}

fn close_frame(reason: CloseReason) -> CloseFrame<'static> {
    let code = match reason {
        CloseReason::Protocol => CloseCode::Protocol,
        CloseReason::PolicyViolation => CloseCode::Policy,
    };
    CloseFrame {
        code,
        reason: reason.description().into(),
    }
}
