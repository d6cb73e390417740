//! Message protocol definitions
//!
//! Plain-text wire protocol. Every server → client frame is a single line
//! of the form `[<label>] <content>`; the client sends raw text.

use std::fmt;

/// Label for room-wide notices
pub const SERVER_LABEL: &str = "server";
/// Label for `/who` replies
pub const WHO_LABEL: &str = "server::who";
/// Label for usage and validation replies
pub const HELP_LABEL: &str = "server::help";

/// Usage line sent in reply to `/help`
pub const HELP_TEXT: &str = "Possible commands are /user, /help and /who";

/// Server → Client message
///
/// `Display` renders the exact text frame sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Labelled chat line, used for member messages, notices and private replies
    Chat { from: String, content: String },
    /// Reply to `/who`
    Who { names: Vec<String> },
    /// Reply to `/help`
    Help,
}

impl ServerMessage {
    /// Chat line from `from`
    pub fn chat(from: impl Into<String>, content: impl Into<String>) -> Self {
        ServerMessage::Chat {
            from: from.into(),
            content: content.into(),
        }
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Chat { from, content } => write!(f, "[{from}] {content}"),
            ServerMessage::Who { names } => write!(f, "[{WHO_LABEL}] {}", names.join(", ")),
            ServerMessage::Help => write!(f, "[{HELP_LABEL}] {HELP_TEXT}"),
        }
    }
}

/// Room-wide membership notice, broadcast under [`SERVER_LABEL`]
///
/// `Display` renders the notice body only; the label is added by the
/// sender-qualified broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// First connection of a session arrived
    Joined { name: String },
    /// Last connection of a session went away
    Left { name: String },
    /// Display name changed
    Renamed { from: String, to: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Joined { name } => write!(f, "Member joined: {name}."),
            Notice::Left { name } => write!(f, "Member left: {name}."),
            Notice::Renamed { from, to } => write!(f, "Member renamed from {from} to {to}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_line() {
        let msg = ServerMessage::chat("alice", "hello there");
        assert_eq!(msg.to_string(), "[alice] hello there");
    }

    #[test]
    fn test_membership_notices() {
        let joined = Notice::Joined {
            name: "user1".to_string(),
        };
        let left = Notice::Left {
            name: "user1".to_string(),
        };
        let renamed = Notice::Renamed {
            from: "user1".to_string(),
            to: "bob".to_string(),
        };
        assert_eq!(joined.to_string(), "Member joined: user1.");
        assert_eq!(left.to_string(), "Member left: user1.");
        assert_eq!(renamed.to_string(), "Member renamed from user1 to bob");
        assert_eq!(
            ServerMessage::chat(SERVER_LABEL, joined.to_string()).to_string(),
            "[server] Member joined: user1."
        );
    }

    #[test]
    fn test_who_and_help() {
        let who = ServerMessage::Who {
            names: vec!["bob".to_string(), "user2".to_string()],
        };
        assert_eq!(who.to_string(), "[server::who] bob, user2");
        assert_eq!(
            ServerMessage::Help.to_string(),
            "[server::help] Possible commands are /user, /help and /who"
        );
    }
}
