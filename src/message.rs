//! Outbound message definitions
//!
//! Every line the server writes to a client is a `ServerMessage`. The wire
//! form is its `Display` output; the line codec appends the newline.

use std::fmt;

use crate::error::{AuthError, CommandError};

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Successful `connect`
    Welcome { username: String },
    /// Failed `connect`, whatever the reason
    InvalidCredentials,
    /// `disconnect` while authenticated
    Disconnected,
    /// `disconnect` while anonymous
    NotConnected,
    /// Malformed command, rendered as its usage string
    Usage(CommandError),
    /// Chat line broadcast by another session
    Chat { from: String, text: String },
    /// Unrecognised line, echoed back to its sender
    UnknownCommand { text: String },
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Welcome { username } => write!(f, "welcome {}", username),
            ServerMessage::InvalidCredentials => f.write_str("invalid credentials"),
            ServerMessage::Disconnected => f.write_str("you were disconnected"),
            ServerMessage::NotConnected => f.write_str("you are not connected"),
            ServerMessage::Usage(err) => write!(f, "{}", err),
            ServerMessage::Chat { from, text } => write!(f, "{}: {}", from, text),
            ServerMessage::UnknownCommand { text } => write!(f, "{}: unknown command", text),
        }
    }
}

/// Both failure reasons look the same to the peer
impl From<AuthError> for ServerMessage {
    fn from(_: AuthError) -> Self {
        ServerMessage::InvalidCredentials
    }
}

impl From<CommandError> for ServerMessage {
    fn from(err: CommandError) -> Self {
        ServerMessage::Usage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_text() {
        let welcome = ServerMessage::Welcome {
            username: "alice".to_string(),
        };
        assert_eq!(welcome.to_string(), "welcome alice");
        assert_eq!(ServerMessage::Disconnected.to_string(), "you were disconnected");
        assert_eq!(ServerMessage::NotConnected.to_string(), "you are not connected");
    }

    #[test]
    fn test_chat_and_unknown_text() {
        let chat = ServerMessage::Chat {
            from: "guest".to_string(),
            text: "hello  there".to_string(),
        };
        assert_eq!(chat.to_string(), "guest: hello  there");

        let unknown = ServerMessage::UnknownCommand {
            text: "dance".to_string(),
        };
        assert_eq!(unknown.to_string(), "dance: unknown command");
    }

    #[test]
    fn test_auth_errors_share_peer_text() {
        let not_found: ServerMessage = AuthError::UserNotFound.into();
        let bad_password: ServerMessage = AuthError::InvalidCredentials.into();
        assert_eq!(not_found, bad_password);
        assert_eq!(not_found.to_string(), "invalid credentials");
    }

    #[test]
    fn test_command_error_to_usage() {
        let msg: ServerMessage = CommandError::MalformedConnect.into();
        assert_eq!(msg.to_string(), "usage: connect <username> <password>");

        let msg: ServerMessage = CommandError::MalformedDisconnect.into();
        assert_eq!(msg.to_string(), "usage: disconnect");
    }
}
