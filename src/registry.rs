//! Connection registry and broadcast fan-out
//!
//! Tracks every live session. A session is present from the moment it is
//! accepted until its read loop ends or a write to it fails, whichever
//! comes first.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::message::ServerMessage;
use crate::session::SessionHandle;
use crate::types::SessionId;

/// Shared set of live sessions
///
/// Clones refer to the same registry. The lock is never held while
/// queueing messages or closing transports.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    sessions: Arc<Mutex<HashMap<SessionId, SessionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session
    pub fn add(&self, handle: SessionHandle) {
        let mut sessions = self.sessions.lock();
        sessions.insert(handle.id, handle);
        debug!("Total sessions: {}", sessions.len());
    }

    /// Deregister a session and close its transport at once
    ///
    /// Anything still queued for the session is discarded. Idempotent:
    /// returns false if the session was already gone.
    pub fn remove(&self, id: SessionId) -> bool {
        match self.take(id) {
            Some(handle) => {
                handle.close();
                true
            }
            None => false,
        }
    }

    /// Deregister a session without closing it
    ///
    /// Its writer keeps draining what is already queued and closes the
    /// transport once every handle to the queue is gone.
    pub fn take(&self, id: SessionId) -> Option<SessionHandle> {
        let removed = self.sessions.lock().remove(&id);
        if removed.is_some() {
            debug!("Session {} removed from registry", id);
        }
        removed
    }

    pub fn get(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions.lock().get(&id).cloned()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Snapshot of the sessions live right now
    ///
    /// Entries may be removed concurrently after the snapshot is taken.
    pub fn sessions(&self) -> Vec<SessionHandle> {
        self.sessions.lock().values().cloned().collect()
    }

    /// Queue `msg` on one session, deregistering it if the queue rejects the message
    pub fn send_to(&self, handle: &SessionHandle, msg: ServerMessage) -> bool {
        match handle.send(msg) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping session {} ({}): {}", handle.id, handle.peer, e);
                self.remove(handle.id);
                false
            }
        }
    }

    /// Queue `msg` on every live session except `sender`
    ///
    /// Best effort per recipient: a recipient that cannot accept the message
    /// is deregistered and the others still receive it. Returns how many
    /// sessions the message was queued on.
    pub fn broadcast(&self, sender: SessionId, msg: &ServerMessage) -> usize {
        let mut delivered = 0;
        for handle in self.sessions() {
            if handle.id != sender && self.send_to(&handle, msg.clone()) {
                delivered += 1;
            }
        }
        delivered
    }
}
