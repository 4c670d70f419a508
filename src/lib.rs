//! Line-based TCP Talker Library
//!
//! A small "MUD"-style chat service: clients connect over TCP, optionally
//! authenticate against a directory of named accounts, and broadcast text
//! lines to every other connected client.
//!
//! # Protocol
//! One command per line:
//! - `connect <username> <password>` → `welcome <username>` or `invalid credentials`
//! - `disconnect` → `you were disconnected` or `you are not connected`
//! - `say <text...>` → everyone else receives `<name>: <text>` (`guest` when anonymous)
//! - anything else → `<line>: unknown command`
//!
//! # Architecture
//! - `UserDirectory` and `ConnectionRegistry` are shared, lock-guarded state
//! - Each connection has a read loop task and a single writer task
//! - All lines for a session go through one ordered `mpsc` queue, so replies
//!   and broadcasts reach the socket in the order they were queued
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use talker_server::{ChatServer, ServerConfig, UserDirectory};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     let users = Arc::new(UserDirectory::with_default_users());
//!
//!     ChatServer::new(users, ServerConfig::default()).run(listener).await;
//! }
//! ```

pub mod codec;
pub mod command;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod server;
pub mod session;
pub mod types;
pub mod user;

// Re-export main types for convenience
pub use codec::LineCodec;
pub use command::Command;
pub use error::{AppError, AuthError, CommandError, SendError};
pub use handler::{start_session, Session};
pub use message::ServerMessage;
pub use registry::ConnectionRegistry;
pub use server::{ChatServer, ServerConfig};
pub use session::SessionHandle;
pub use types::SessionId;
pub use user::{User, UserDirectory};
