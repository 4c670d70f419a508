//! Line command parser
//!
//! Turns one input line into a typed `Command`. Keywords are matched
//! case-sensitively on the first whitespace-delimited token.

use crate::error::CommandError;

pub const CONNECT: &str = "connect";
pub const DISCONNECT: &str = "disconnect";
pub const SAY: &str = "say";

/// Client → Server command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `connect <username> <password>`
    Connect { username: String, password: String },
    /// `disconnect`
    Disconnect,
    /// `say <text...>`; text is kept verbatim and may be empty
    Say { text: String },
    /// Anything else, carrying the whole original line
    Unknown { text: String },
}

/// Parse a single line
///
/// Returns `Ok(None)` for a line with no tokens at all.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let mut tokens = line.split_whitespace();

    let Some(keyword) = tokens.next() else {
        return Ok(None);
    };

    let command = match keyword {
        CONNECT => {
            let (Some(username), Some(password), None) =
                (tokens.next(), tokens.next(), tokens.next())
            else {
                return Err(CommandError::MalformedConnect);
            };
            Command::Connect {
                username: username.to_string(),
                password: password.to_string(),
            }
        }
        DISCONNECT => {
            if tokens.next().is_some() {
                return Err(CommandError::MalformedDisconnect);
            }
            Command::Disconnect
        }
        SAY => Command::Say {
            text: say_text(line).to_string(),
        },
        _ => Command::Unknown {
            text: line.to_string(),
        },
    };

    Ok(Some(command))
}

/// Everything after the `say` keyword and the single separator following it
fn say_text(line: &str) -> &str {
    let start = line.len() - line.trim_start().len() + SAY.len();
    let rest = &line[start..];

    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        _ => rest,
    }
}
