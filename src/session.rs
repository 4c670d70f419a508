//! Session handle definition
//!
//! The registry's view of one live session: its identity, its ordered
//! outbound queue, and the signal that closes its transport.

use std::net::SocketAddr;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::SessionId;

/// Cheaply cloneable handle to a live session
///
/// Messages sent through the handle are written to the socket by the
/// session's single writer task, in the order they were queued.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Unique identifier for this session
    pub id: SessionId,
    /// Remote address of the connection
    pub peer: SocketAddr,
    /// Queue feeding the writer task
    sender: mpsc::Sender<ServerMessage>,
    /// Cancelled when the session is deregistered
    closed: CancellationToken,
}

impl SessionHandle {
    pub fn new(
        id: SessionId,
        peer: SocketAddr,
        sender: mpsc::Sender<ServerMessage>,
        closed: CancellationToken,
    ) -> Self {
        Self {
            id,
            peer,
            sender,
            closed,
        }
    }

    /// Queue a message for this session without waiting
    ///
    /// Fails if the writer task is gone or its queue is full.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }

    /// Signal the read loop and writer task to stop, dropping the transport
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}
