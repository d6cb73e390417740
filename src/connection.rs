//! Connection handle abstraction
//!
//! The hub never owns a socket. It only holds handles that can send a
//! text frame or close the connection with a reason.

use async_trait::async_trait;

use crate::error::SendError;
use crate::types::ConnectionId;

/// Why the hub is closing a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// A send to the connection failed
    Protocol,
    /// The connection has no session
    PolicyViolation,
}

impl CloseReason {
    /// Human-readable close reason carried in the close frame
    pub fn description(self) -> &'static str {
        match self {
            CloseReason::Protocol => "",
            CloseReason::PolicyViolation => "No session",
        }
    }
}

/// One live connection as seen by the hub
#[async_trait]
pub trait Connection: Send + Sync + std::fmt::Debug {
    /// Identifier used to remove this connection on leave
    fn id(&self) -> ConnectionId;

    /// Queue a text frame for the peer
    async fn send(&self, text: &str) -> Result<(), SendError>;

    /// Ask the transport to close the connection
    async fn close(&self, reason: CloseReason) -> Result<(), SendError>;

    /// True once `close` has been requested; the hub stops sending to it
    fn is_closed(&self) -> bool;
}
