//! Basic type definitions for the talker
//!
//! Provides the `SessionId` newtype, the stable key under which every
//! live session is registered.

use uuid::Uuid;

/// Registry key of one accepted connection
///
/// A random v4 UUID minted at accept time and never reused, so removing a
/// stale id can only ever hit the session it was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
