//! ChatHub implementation
//!
//! The single owner of room state: members, display names and history.
//! Connection drivers call into it concurrently from their own tasks.
//!
//! Every mutation happens under a short critical section. Sends always run
//! after the lock is released, against a snapshot of the target handles, so
//! a slow peer only ever delays itself. Locks are taken in the order
//! room, then history.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::command::ClientMessage;
use crate::config::Config;
use crate::connection::{CloseReason, Connection};
use crate::error::SendError;
use crate::history::History;
use crate::message::{Notice, ServerMessage, HELP_LABEL, SERVER_LABEL};
use crate::room::{ConnectionRef, Room};
use crate::types::{ConnectionId, SessionId};

/// Default upper bound on a single send
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// The chat hub
pub struct ChatHub {
    /// Source of `user<N>` default names
    user_counter: AtomicU64,
    /// Membership and display names
    room: RwLock<Room>,
    /// Recent chat lines for new joiners
    history: Mutex<History>,
    /// Upper bound on a single send before the connection is given up on
    send_timeout: Duration,
}

impl ChatHub {
    /// Create a hub keeping `history_capacity` messages
    pub fn new(history_capacity: usize, send_timeout: Duration) -> Self {
        Self {
            user_counter: AtomicU64::new(0),
            room: RwLock::new(Room::new()),
            history: Mutex::new(History::new(history_capacity)),
            send_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.history_capacity, config.send_timeout())
    }

    /// Register a connection for a session
    ///
    /// The first connection of a session announces the member to the whole
    /// room. Every connection then gets the history replayed, oldest first.
    pub async fn join(&self, session: &SessionId, connection: ConnectionRef) {
        let (joined, backlog) = {
            let mut room = self.room.write().await;
            let joined = room.add_connection(session, Arc::clone(&connection), || {
                self.next_default_name()
            });
            let backlog = self.history.lock().await.snapshot();
            (joined, backlog)
        };

        info!(
            "Connection {} joined session {} as '{}'",
            connection.id(),
            session,
            joined.name
        );

        if joined.first {
            let notice = Notice::Joined { name: joined.name };
            self.broadcast_from(SERVER_LABEL, &notice.to_string()).await;
        }

        for line in &backlog {
            if !self.deliver(connection.as_ref(), line).await {
                break;
            }
        }
    }

    /// Unregister a connection
    ///
    /// Unknown sessions and connections are ignored. The session's last
    /// connection leaving announces the departure to the room.
    pub async fn leave(&self, session: &SessionId, connection: ConnectionId) {
        let departed = self.room.write().await.remove_connection(session, connection);

        debug!("Connection {} left session {}", connection, session);

        if let Some(name) = departed {
            info!("Member '{}' ({}) left", name, session);
            self.broadcast_from(SERVER_LABEL, &Notice::Left { name }.to_string())
                .await;
        }
    }

    /// Change a session's display name and announce it
    ///
    /// No validation happens here; see [`ClientMessage::parse`].
    pub async fn rename(&self, session: &SessionId, new_name: &str) {
        let old_name = self.room.write().await.rename(session, new_name);

        info!("Session {} renamed from '{}' to '{}'", session, old_name, new_name);

        let notice = Notice::Renamed {
            from: old_name,
            to: new_name.to_string(),
        };
        self.broadcast_from(SERVER_LABEL, &notice.to_string()).await;
    }

    /// Send the member list to every connection of `session`
    pub async fn who(&self, session: &SessionId) {
        let (targets, names) = {
            let room = self.room.read().await;
            (room.connections(session), room.names())
        };
        self.deliver_all(&targets, &ServerMessage::Who { names }.to_string())
            .await;
    }

    /// Send the usage line to every connection of `session`
    pub async fn help(&self, session: &SessionId) {
        let targets = self.room.read().await.connections(session);
        self.deliver_all(&targets, &ServerMessage::Help.to_string())
            .await;
    }

    /// Send `[<sender>] <message>` to every connection of `recipient`
    ///
    /// Does nothing if the recipient is not connected.
    pub async fn send_to(&self, recipient: &SessionId, sender: &str, message: &str) {
        let targets = self.room.read().await.connections(recipient);
        if targets.is_empty() {
            debug!("Dropping message for absent session {}", recipient);
            return;
        }
        self.deliver_all(&targets, &ServerMessage::chat(sender, message).to_string())
            .await;
    }

    /// Broadcast a chat message from `sender` and record it in history
    pub async fn message(&self, sender: &SessionId, text: &str) {
        let (line, targets) = {
            let room = self.room.read().await;
            let name = room
                .display_name(sender.as_str())
                .map_or_else(|| sender.to_string(), str::to_owned);
            let line = ServerMessage::chat(name, text).to_string();
            // Same critical section as the target snapshot, so a racing
            // joiner sees the line exactly once
            self.history.lock().await.push(line.clone());
            (line, room.all_connections())
        };
        self.deliver_all(&targets, &line).await;
    }

    /// Send `text` verbatim to every connection in the room
    pub async fn broadcast(&self, text: &str) {
        let targets = self.room.read().await.all_connections();
        self.deliver_all(&targets, text).await;
    }

    /// Broadcast `[<name>] <text>`, where `sender` is resolved to a display
    /// name if it is a member session and used as-is otherwise
    ///
    /// Membership notices go through here under [`SERVER_LABEL`]. Session
    /// ids are at least 16 characters, so no member can shadow that label.
    pub async fn broadcast_from(&self, sender: &str, text: &str) {
        let name = self
            .room
            .read()
            .await
            .display_name(sender)
            .map_or_else(|| sender.to_string(), str::to_owned);
        self.broadcast(&ServerMessage::chat(name, text).to_string())
            .await;
    }

    /// Handle one inbound text frame from `session`
    pub async fn dispatch(&self, session: &SessionId, text: &str) {
        match ClientMessage::parse(text) {
            Ok(ClientMessage::Who) => self.who(session).await,
            Ok(ClientMessage::Rename(name)) => self.rename(session, &name).await,
            Ok(ClientMessage::Help) => self.help(session).await,
            Ok(ClientMessage::Chat(text)) => self.message(session, &text).await,
            Err(err) => {
                debug!("Rejected command from {}: {}", session, err);
                self.send_to(session, HELP_LABEL, &err.to_string()).await;
            }
        }
    }

    /// Current display name of a session
    pub async fn display_name(&self, session: &SessionId) -> Option<String> {
        self.room
            .read()
            .await
            .display_name(session.as_str())
            .map(str::to_owned)
    }

    /// Names of all members, sorted
    pub async fn member_names(&self) -> Vec<String> {
        self.room.read().await.names()
    }

    /// Number of member sessions
    pub async fn member_count(&self) -> usize {
        self.room.read().await.member_count()
    }

    /// Number of open connections for a session
    pub async fn connection_count(&self, session: &SessionId) -> usize {
        self.room.read().await.connection_count(session)
    }

    /// Copy of the history, oldest first
    pub async fn history(&self) -> Vec<String> {
        self.history.lock().await.snapshot()
    }

    fn next_default_name(&self) -> String {
        let n = self.user_counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("user{n}")
    }

    /// Send to every target concurrently
    async fn deliver_all(&self, targets: &[ConnectionRef], text: &str) {
        join_all(targets.iter().map(|c| self.deliver(c.as_ref(), text))).await;
    }

    /// Send to a single connection, closing it on failure
    ///
    /// Returns false if the send failed. Failed sends are not retried.
    async fn deliver(&self, connection: &dyn Connection, text: &str) -> bool {
        let result = match timeout(self.send_timeout, connection.send(text)).await {
            Ok(result) => result,
            Err(_) => Err(SendError::Timeout),
        };

        let Err(err) = result else {
            return true;
        };

        warn!(
            "Send to connection {} failed ({}), closing it",
            connection.id(),
            err
        );
        if let Err(err) = connection.close(CloseReason::Protocol).await {
            debug!("Connection {} already gone: {}", connection.id(), err);
        }
        false
    }
}

impl std::fmt::Debug for ChatHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatHub")
            .field("user_counter", &self.user_counter)
            .field("send_timeout", &self.send_timeout)
            .finish_non_exhaustive()
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new(crate::history::DEFAULT_HISTORY_CAPACITY, DEFAULT_SEND_TIMEOUT)
    }
}
