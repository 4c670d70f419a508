//! Talker Server - Entry Point
//!
//! Loads the user directory, binds the TCP listener and runs the accept loop.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use talker_server::{ChatServer, ServerConfig, UserDirectory};

/// Default server address
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=talker_server=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("talker_server=info")),
        )
        .init();

    // Get bind address from command line or use default
    let addr = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    let users = Arc::new(UserDirectory::with_default_users());
    info!("Loaded {} users", users.len());

    // Binding is the only fatal failure
    let listener = TcpListener::bind(&addr).await?;
    info!("Talker server listening on {}", addr);

    ChatServer::new(users, ServerConfig::default())
        .run(listener)
        .await;

    Ok(())
}
