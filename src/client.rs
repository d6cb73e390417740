//! Client struct definition
//!
//! The channel-backed connection handle handed to the hub. The write half
//! of the WebSocket drains the paired [`Outbox`].

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::connection::{CloseReason, Connection};
use crate::error::SendError;
use crate::types::ConnectionId;

/// Connected client handle
///
/// Holds the connection ID, the outbound text channel and the close signal.
/// Text frames go through a bounded FIFO so a single connection sees them in
/// the order the hub sent them.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// Hub → client text channel
    sender: mpsc::Sender<String>,
    /// Close request, kept out of the text channel so it is never stuck behind a full buffer
    close: watch::Sender<Option<CloseReason>>,
}

/// Receiving side of a [`Client`], owned by the connection's write task
#[derive(Debug)]
pub struct Outbox {
    /// Text frames to forward to the peer
    pub messages: mpsc::Receiver<String>,
    /// Set once the hub asks for the connection to be closed
    pub close: watch::Receiver<Option<CloseReason>>,
}

impl Client {
    /// Create a new client handle with a text buffer of `buffer` frames
    pub fn new(buffer: usize) -> (Self, Outbox) {
        let (sender, messages) = mpsc::channel(buffer);
        let (close, close_rx) = watch::channel(None);
        let client = Self {
            id: ConnectionId::new(),
            sender,
            close,
        };
        let outbox = Outbox {
            messages,
            close: close_rx,
        };
        (client, outbox)
    }
}

#[async_trait]
impl Connection for Client {
    fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns an error if the channel is closed (client disconnected).
    async fn send(&self, text: &str) -> Result<(), SendError> {
        self.sender
            .send(text.to_owned())
            .await
            .map_err(|_| SendError::ChannelClosed)
    }

    /// The reason is recorded even when the write task is already gone.
    async fn close(&self, reason: CloseReason) -> Result<(), SendError> {
        self.close.send_replace(Some(reason));
        if self.close.is_closed() {
            return Err(SendError::ChannelClosed);
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.close.borrow().is_some()
    }
}
