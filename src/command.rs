//! Inbound command grammar
//!
//! Classifies one raw text frame. The first matching prefix wins, so
//! `/whoami` is still `/who`.

use crate::error::CommandError;

/// Longest accepted display name, in characters
pub const MAX_NAME_LEN: usize = 50;

/// Client → Server message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// List the members in the room
    Who,
    /// Change the sender's display name
    Rename(String),
    /// Show the usage line
    Help,
    /// Plain chat message
    Chat(String),
}

impl ClientMessage {
    /// Parse a raw text frame
    ///
    /// Validation failures are returned as [`CommandError`]; their text is
    /// meant for the sender only.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        if text.starts_with("/who") {
            Ok(ClientMessage::Who)
        } else if let Some(rest) = text.strip_prefix("/user") {
            let name = rest.trim();
            if name.is_empty() {
                Err(CommandError::BlankName)
            } else if name.chars().count() > MAX_NAME_LEN {
                Err(CommandError::NameTooLong)
            } else {
                Ok(ClientMessage::Rename(name.to_string()))
            }
        } else if text.starts_with("/help") {
            Ok(ClientMessage::Help)
        } else if text.starts_with('/') {
            let token = text.split(char::is_whitespace).next().unwrap_or(text);
            Err(CommandError::UnknownCommand(token.to_string()))
        } else {
            Ok(ClientMessage::Chat(text.to_string()))
        }
    }
}
