//! Error types for the talker
//!
//! Defines the fatal per-connection error, outbound queue errors,
//! authentication failures and command format errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;
use tokio_util::codec::AnyDelimiterCodecError;

/// Connection-level errors
///
/// Anything that ends a session's read loop abnormally. Never sent to a peer.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Line framing error (fatal), e.g. a line longer than the configured maximum
    #[error("Line codec error: {0}")]
    Codec(#[from] AnyDelimiterCodecError),
}

/// Outbound queue errors
///
/// Occurs when a message cannot be queued for a session's writer task.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// The writer task has gone away
    #[error("Channel closed")]
    ChannelClosed,

    /// The writer task is not keeping up with its queue
    #[error("Outbound queue full")]
    QueueFull,
}

/// Authentication failures
///
/// The two variants are kept apart for logging; peers see the same text for both.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("auth: user not found")]
    UserNotFound,

    #[error("auth: invalid credentials")]
    InvalidCredentials,
}

/// Malformed command lines
///
/// The display form is the usage string sent back to the peer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    #[error("usage: connect <username> <password>")]
    MalformedConnect,

    #[error("usage: disconnect")]
    MalformedDisconnect,
}
