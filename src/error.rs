//! Error types for the chat hub
//!
//! Defines application-level errors, per-connection send errors and
//! command validation errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::command::MAX_NAME_LEN;

/// Application-level errors
///
/// All of these are fatal for the connection or process that hit them.
/// Recoverable conditions never surface as `AppError`.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Config file could not be parsed
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config value out of range
    #[error("Invalid config: {0}")]
    Config(String),
}

/// Message send errors
///
/// Occurs when delivering a frame to a single connection fails.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The peer did not accept the frame in time
    #[error("Send timed out")]
    Timeout,
}

/// Command validation errors
///
/// The display text is what the offending user sees as a help line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// `/user` without a name
    ///
    /// Replies with a usage hint rather than echoing the offending name,
    /// which is always empty after trimming.
    #[error("/user [<name>]")]
    BlankName,

    /// `/user` with a name over the limit
    #[error("new name is too long: {} characters limit", MAX_NAME_LEN)]
    NameTooLong,

    /// Anything starting with `/` that is not a known command
    #[error("Unknown command {0}")]
    UnknownCommand(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_text() {
        assert_eq!(CommandError::BlankName.to_string(), "/user [<name>]");
        assert_eq!(
            CommandError::NameTooLong.to_string(),
            "new name is too long: 50 characters limit"
        );
        assert_eq!(
            CommandError::UnknownCommand("/nope".to_string()).to_string(),
            "Unknown command /nope"
        );
    }
}
