//! Basic type definitions for the chat hub
//!
//! Provides newtype wrappers for type safety:
//! - `SessionId`: opaque per-client identity, stable across reconnects
//! - `ConnectionId`: UUID-based identifier of one live connection

use std::borrow::Borrow;

use uuid::Uuid;

/// Length of a freshly minted session id
const SESSION_ID_LEN: usize = 32;

/// Session identifier (newtype pattern)
///
/// Shared by every connection a client opens with the same cookie.
/// Implements `Borrow<str>` so maps keyed by it can be queried with `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an externally issued session id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random 32-character alphanumeric session id
    pub fn generate() -> Self {
        use rand::Rng;
        let id: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(SESSION_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4. Lets the hub remove exactly one of a session's
/// connections on leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
