//! ChatServer implementation
//!
//! Holds the process-wide shared state (user directory and connection
//! registry) and runs the accept loop that turns connections into sessions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::handler::start_session;
use crate::registry::ConnectionRegistry;
use crate::types::SessionId;
use crate::user::UserDirectory;

/// Default capacity of each session's outbound queue
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;

/// Default maximum accepted input line length, in bytes
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Default time a single line may take to reach the socket
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-session tuning
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Messages a session may have queued before it is treated as a failed recipient
    pub outbound_capacity: usize,
    /// Longer input lines end the session
    pub max_line_length: usize,
    /// A peer that does not take a line within this time is dropped
    pub write_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// The talker server
///
/// Each accepted connection gets its own session task; sessions share the
/// user directory and the connection registry.
pub struct ChatServer {
    users: Arc<UserDirectory>,
    registry: ConnectionRegistry,
    config: ServerConfig,
}

impl ChatServer {
    pub fn new(users: Arc<UserDirectory>, config: ServerConfig) -> Self {
        Self {
            users,
            registry: ConnectionRegistry::new(),
            config,
        }
    }

    pub fn users(&self) -> &Arc<UserDirectory> {
        &self.users
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Accept connections forever
    ///
    /// Accept errors are logged and do not stop the loop.
    pub async fn run(self, listener: TcpListener) {
        info!("ChatServer started");

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    self.accept(stream, addr);
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Register a connection and spawn its session task
    pub fn accept<S>(&self, stream: S, peer: SocketAddr) -> SessionId
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (id, session) = start_session(
            stream,
            peer,
            self.users.clone(),
            self.registry.clone(),
            &self.config,
        );

        tokio::spawn(async move {
            if let Err(e) = session.await {
                error!("Connection error: {} ({})", peer, e);
            }
        });

        id
    }
}
