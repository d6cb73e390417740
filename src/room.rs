//! Room struct definition
//!
//! Membership and display names for the single chat room. Plain data with
//! no locking; the hub wraps it in a lock and never holds that lock across
//! a send.

use std::collections::HashMap;
use std::sync::Arc;

use crate::connection::Connection;
use crate::types::{ConnectionId, SessionId};

/// Shared connection handle as stored in the room
pub type ConnectionRef = Arc<dyn Connection>;

/// Outcome of registering a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    /// Current display name of the session
    pub name: String,
    /// True if this is the session's only connection
    pub first: bool,
}

/// The chat room
///
/// `members` and `names` always share the same keys, and no session is
/// kept with an empty connection list.
#[derive(Debug, Default)]
pub struct Room {
    /// Open connections per session, in join order
    members: HashMap<SessionId, Vec<ConnectionRef>>,
    /// Display name per session
    names: HashMap<SessionId, String>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under a session
    ///
    /// `default_name` is only called when the session is new.
    pub fn add_connection(
        &mut self,
        session: &SessionId,
        connection: ConnectionRef,
        default_name: impl FnOnce() -> String,
    ) -> Joined {
        let name = self
            .names
            .entry(session.clone())
            .or_insert_with(default_name)
            .clone();
        let connections = self.members.entry(session.clone()).or_default();
        connections.push(connection);

        Joined {
            name,
            first: connections.len() == 1,
        }
    }

    /// Remove one connection from a session
    ///
    /// Returns the session's display name if that was its last connection,
    /// in which case the session is forgotten. Unknown sessions or
    /// connections are ignored.
    pub fn remove_connection(&mut self, session: &SessionId, id: ConnectionId) -> Option<String> {
        let connections = self.members.get_mut(session)?;
        let before = connections.len();
        connections.retain(|c| c.id() != id);
        if connections.len() == before || !connections.is_empty() {
            return None;
        }

        self.members.remove(session);
        Some(
            self.names
                .remove(session)
                .unwrap_or_else(|| session.to_string()),
        )
    }

    /// Replace a session's display name, returning the previous one
    ///
    /// A session that is not a member keeps no name; its id stands in for
    /// the old name.
    pub fn rename(&mut self, session: &SessionId, new_name: &str) -> String {
        match self.names.get_mut(session) {
            Some(name) => std::mem::replace(name, new_name.to_string()),
            None => session.to_string(),
        }
    }

    /// Display name of a session, if it is a member
    pub fn display_name(&self, session: &str) -> Option<&str> {
        self.names.get(session).map(String::as_str)
    }

    /// Snapshot of one session's open connections
    ///
    /// Connections already asked to close are skipped; they stay registered
    /// only until their driver leaves.
    pub fn connections(&self, session: &SessionId) -> Vec<ConnectionRef> {
        self.members
            .get(session)
            .into_iter()
            .flatten()
            .filter(|c| !c.is_closed())
            .cloned()
            .collect()
    }

    /// Snapshot of every open connection in the room
    pub fn all_connections(&self) -> Vec<ConnectionRef> {
        self.members
            .values()
            .flatten()
            .filter(|c| !c.is_closed())
            .cloned()
            .collect()
    }

    /// Names of all members, one per session, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.values().cloned().collect();
        names.sort();
        names
    }

    /// Number of member sessions
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Number of open connections for a session
    pub fn connection_count(&self, session: &SessionId) -> usize {
        self.members.get(session).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Client, Outbox};
    use crate::connection::CloseReason;

    fn connection() -> (ConnectionRef, Outbox) {
        let (client, outbox) = Client::new(8);
        let connection: ConnectionRef = Arc::new(client);
        (connection, outbox)
    }

    #[test]
    fn test_room_first_join() {
        let mut room = Room::new();
        let session = SessionId::new("a");
        let (conn, _outbox) = connection();

        let joined = room.add_connection(&session, conn, || "user1".to_string());

        assert_eq!(
            joined,
            Joined {
                name: "user1".to_string(),
                first: true
            }
        );
        assert_eq!(room.connection_count(&session), 1);
        assert_eq!(room.member_count(), 1);
        assert_eq!(room.display_name("a"), Some("user1"));
    }

    #[test]
    fn test_room_second_connection_keeps_name() {
        let mut room = Room::new();
        let session = SessionId::new("a");
        let (conn1, _o1) = connection();
        let (conn2, _o2) = connection();

        room.add_connection(&session, conn1, || "user1".to_string());
        let joined = room.add_connection(&session, conn2, || panic!("name assigned twice"));

        assert_eq!(joined.name, "user1");
        assert!(!joined.first);
        assert_eq!(room.connection_count(&session), 2);
        assert_eq!(room.member_count(), 1);
    }

    #[test]
    fn test_room_remove_connections() {
        let mut room = Room::new();
        let session = SessionId::new("a");
        let (conn1, _o1) = connection();
        let (conn2, _o2) = connection();
        let (id1, id2) = (conn1.id(), conn2.id());

        room.add_connection(&session, conn1, || "user1".to_string());
        room.add_connection(&session, conn2, || "user1".to_string());

        assert_eq!(room.remove_connection(&session, id1), None);
        assert_eq!(room.connection_count(&session), 1);

        // Removing the same connection again is a no-op
        assert_eq!(room.remove_connection(&session, id1), None);

        assert_eq!(room.remove_connection(&session, id2), Some("user1".to_string()));
        assert_eq!(room.member_count(), 0);
        assert_eq!(room.display_name("a"), None);
        assert_eq!(room.connection_count(&session), 0);
    }

    #[test]
    fn test_room_remove_unknown() {
        let mut room = Room::new();
        assert_eq!(
            room.remove_connection(&SessionId::new("ghost"), ConnectionId::new()),
            None
        );
    }

    #[test]
    fn test_room_rename() {
        let mut room = Room::new();
        let session = SessionId::new("a");
        let (conn, _outbox) = connection();
        room.add_connection(&session, conn, || "user1".to_string());

        assert_eq!(room.rename(&session, "bob"), "user1");
        assert_eq!(room.display_name("a"), Some("bob"));
        assert_eq!(room.names(), vec!["bob".to_string()]);
    }

    #[test]
    fn test_room_rename_non_member() {
        let mut room = Room::new();
        let session = SessionId::new("stranger");

        assert_eq!(room.rename(&session, "bob"), "stranger");
        assert_eq!(room.display_name("stranger"), None);
        assert!(room.names().is_empty());
    }

    #[test]
    fn test_room_snapshots() {
        let mut room = Room::new();
        let a = SessionId::new("a");
        let b = SessionId::new("b");
        let (a1, _o1) = connection();
        let (a2, _o2) = connection();
        let (b1, _o3) = connection();

        room.add_connection(&a, a1, || "zed".to_string());
        room.add_connection(&a, a2, || "zed".to_string());
        room.add_connection(&b, b1, || "amy".to_string());

        assert_eq!(room.connections(&a).len(), 2);
        assert_eq!(room.connections(&SessionId::new("c")).len(), 0);
        assert_eq!(room.all_connections().len(), 3);
        assert_eq!(room.names(), vec!["amy".to_string(), "zed".to_string()]);
    }

    #[tokio::test]
    async fn test_room_snapshots_skip_closed_connections() {
        let mut room = Room::new();
        let a = SessionId::new("a");
        let (a1, _o1) = connection();
        let (a2, _o2) = connection();
        let a2_id = a2.id();

        room.add_connection(&a, a1, || "user1".to_string());
        room.add_connection(&a, Arc::clone(&a2), || "user1".to_string());
        a2.close(CloseReason::Protocol).await.unwrap();

        assert_eq!(room.connections(&a).len(), 1);
        assert_eq!(room.all_connections().len(), 1);
        assert!(room.all_connections().iter().all(|c| c.id() != a2_id));

        // Still registered until its driver leaves
        assert_eq!(room.connection_count(&a), 2);
        assert_eq!(room.remove_connection(&a, a2_id), None);
        assert_eq!(room.connection_count(&a), 1);
    }

    #[test]
    fn test_room_duplicate_names_listed_per_session() {
        let mut room = Room::new();
        let (a1, _o1) = connection();
        let (b1, _o2) = connection();

        room.add_connection(&SessionId::new("a"), a1, || "bob".to_string());
        room.add_connection(&SessionId::new("b"), b1, || "bob".to_string());

        assert_eq!(room.names(), vec!["bob".to_string(), "bob".to_string()]);
    }
}
