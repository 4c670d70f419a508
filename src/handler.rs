//! Connection handler
//!
//! Owns one connection's lifecycle: registration, the line read loop,
//! command dispatch, and the single writer task that drains the session's
//! outbound queue onto the socket.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::codec::{AnyDelimiterCodecError, Framed};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec::LineCodec;
use crate::command::{self, Command};
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::registry::ConnectionRegistry;
use crate::server::ServerConfig;
use crate::session::SessionHandle;
use crate::types::SessionId;
use crate::user::{User, UserDirectory};

/// Name shown for chat from an unauthenticated session
pub const GUEST_NAME: &str = "guest";

/// Per-connection protocol state
///
/// Anonymous while `user` is `None`, authenticated otherwise. Every command
/// outcome is reported to the peer as text; nothing here fails the read loop.
#[derive(Debug)]
pub struct Session {
    handle: SessionHandle,
    user: Option<Arc<User>>,
    users: Arc<UserDirectory>,
    registry: ConnectionRegistry,
}

impl Session {
    pub fn new(
        handle: SessionHandle,
        users: Arc<UserDirectory>,
        registry: ConnectionRegistry,
    ) -> Self {
        Self {
            handle,
            user: None,
            users,
            registry,
        }
    }

    pub fn id(&self) -> SessionId {
        self.handle.id
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Name other sessions see on this session's chat lines
    pub fn display_name(&self) -> &str {
        self.user.as_ref().map_or(GUEST_NAME, |user| user.name())
    }

    /// Parse and dispatch one input line
    pub fn handle_line(&mut self, line: &str) {
        match command::parse(line) {
            Ok(Some(cmd)) => self.handle_command(cmd),
            Ok(None) => {}
            Err(e) => {
                debug!("Malformed command from {}: {:?}", self.handle.id, line);
                self.reply(e.into());
            }
        }
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect { username, password } => self.handle_connect(&username, &password),
            Command::Disconnect => self.handle_disconnect(),
            Command::Say { text } => self.handle_say(text),
            Command::Unknown { text } => self.handle_unknown(text),
        }
    }

    fn handle_connect(&mut self, username: &str, password: &str) {
        match self.users.authenticate(username, password) {
            Ok(user) => {
                info!("Session {} authenticated as '{}'", self.handle.id, user.name());
                let username = user.name().to_string();
                self.user = Some(user);
                self.reply(ServerMessage::Welcome { username });
            }
            Err(e) => {
                debug!("Session {} failed to authenticate: {}", self.handle.id, e);
                self.reply(e.into());
            }
        }
    }

    fn handle_disconnect(&mut self) {
        match self.user.take() {
            Some(user) => {
                info!("Session {} signed out '{}'", self.handle.id, user.name());
                self.reply(ServerMessage::Disconnected);
            }
            None => self.reply(ServerMessage::NotConnected),
        }
    }

    fn handle_say(&self, text: String) {
        if text.is_empty() {
            return;
        }

        let msg = ServerMessage::Chat {
            from: self.display_name().to_string(),
            text,
        };
        let delivered = self.registry.broadcast(self.handle.id, &msg);
        debug!("Session {} broadcast to {} sessions", self.handle.id, delivered);
    }

    fn handle_unknown(&self, text: String) {
        self.reply(ServerMessage::UnknownCommand { text });
    }

    /// Queue a reply on this session's own outbound queue
    fn reply(&self, msg: ServerMessage) {
        self.registry.send_to(&self.handle, msg);
    }

    /// Deregister this session, closing its transport
    pub fn close(&self) {
        self.registry.remove(self.handle.id);
    }

    /// Deregister after the peer hung up; replies already queued still go out
    pub fn leave(&self) {
        self.registry.take(self.handle.id);
    }
}

/// Register a new connection and start its writer task
///
/// The session is visible to broadcasts as soon as this returns. The
/// returned future is the session's read loop; it resolves once the peer
/// closes the connection, a read fails, or the session is deregistered.
pub fn start_session<S>(
    stream: S,
    peer: SocketAddr,
    users: Arc<UserDirectory>,
    registry: ConnectionRegistry,
    config: &ServerConfig,
) -> (SessionId, impl Future<Output = Result<(), AppError>> + Send + 'static)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let id = SessionId::new();
    let framed = Framed::new(stream, LineCodec::new(config.max_line_length));
    let (sink, lines) = framed.split::<String>();

    // Create channel for server -> client messages
    let (msg_tx, msg_rx) = mpsc::channel::<ServerMessage>(config.outbound_capacity);
    let closed = CancellationToken::new();

    let handle = SessionHandle::new(id, peer, msg_tx, closed.clone());
    registry.add(handle.clone());
    info!("Connection added ({}), session {}", peer, id);

    tokio::spawn(write_loop(
        sink,
        msg_rx,
        closed.clone(),
        registry.clone(),
        id,
        config.write_timeout,
    ));

    let session = Session::new(handle, users, registry);
    (id, read_loop(lines, session, closed))
}

/// Read lines until EOF, a read error, or deregistration
///
/// Dropping the session at the end releases the last sender on its queue,
/// which lets the writer finish.
async fn read_loop<R>(
    mut lines: R,
    mut session: Session,
    closed: CancellationToken,
) -> Result<(), AppError>
where
    R: Stream<Item = Result<String, AnyDelimiterCodecError>> + Unpin,
{
    let peer = session.handle.peer;

    let result = loop {
        let next = tokio::select! {
            _ = closed.cancelled() => None,
            next = lines.next() => next,
        };

        match next {
            Some(Ok(line)) => session.handle_line(&line),
            Some(Err(e)) => break Err(AppError::from(e)),
            None => break Ok(()),
        }
    };

    match result {
        Ok(()) => {
            session.leave();
            info!("Connection closed ({}), session {}", peer, session.id());
        }
        Err(_) => session.close(),
    }

    result
}

/// Drain the outbound queue onto the socket, one line per message, in order
///
/// Cancellation drops the transport on the spot, queued lines included.
/// When the queue ends because every sender is gone, the transport is
/// flushed and shut down. Every write, the final one included, is bounded
/// by `write_timeout`.
async fn write_loop<W>(
    mut sink: W,
    mut outbound: mpsc::Receiver<ServerMessage>,
    closed: CancellationToken,
    registry: ConnectionRegistry,
    id: SessionId,
    write_timeout: Duration,
) where
    W: Sink<String, Error = AnyDelimiterCodecError> + Unpin,
{
    loop {
        let msg = tokio::select! {
            biased;
            _ = closed.cancelled() => {
                debug!("Write task for {} cancelled", id);
                return;
            }
            msg = outbound.recv() => msg,
        };
        let Some(msg) = msg else {
            break;
        };

        let written = tokio::select! {
            biased;
            _ = closed.cancelled() => {
                debug!("Write task for {} cancelled", id);
                return;
            }
            written = timeout(write_timeout, sink.send(msg.to_string())) => written,
        };

        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Write to session {} failed: {}", id, e);
                registry.remove(id);
                return;
            }
            Err(_) => {
                warn!("Write to session {} timed out", id);
                registry.remove(id);
                return;
            }
        }
    }

    if timeout(write_timeout, sink.close()).await.is_err() {
        debug!("Shutdown of session {} timed out", id);
    }
    debug!("Write task ended for {}", id);
}
