use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};
use tokio_util::codec::{Framed, LinesCodec};

use talker_server::{ChatServer, ConnectionRegistry, ServerConfig, UserDirectory};

type Client = Framed<TcpStream, LinesCodec>;

async fn start() -> (std::net::SocketAddr, ConnectionRegistry) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = ChatServer::new(
        Arc::new(UserDirectory::with_default_users()),
        ServerConfig::default(),
    );
    let registry = server.registry().clone();
    tokio::spawn(server.run(listener));

    (addr, registry)
}

async fn wait_for_sessions(registry: &ConnectionRegistry, count: usize) {
    timeout(Duration::from_secs(2), async {
        while registry.len() != count {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("session count never reached");
}

async fn connect(addr: std::net::SocketAddr) -> Client {
    Framed::new(TcpStream::connect(addr).await.unwrap(), LinesCodec::new())
}

async fn recv(client: &mut Client) -> String {
    timeout(Duration::from_secs(2), client.next())
        .await
        .expect("timed out waiting for a line")
        .expect("connection closed")
        .unwrap()
}

#[tokio::test]
async fn test_chat_over_tcp() {
    let (addr, registry) = start().await;

    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;
    wait_for_sessions(&registry, 2).await;

    alice.send("connect user1 password1").await.unwrap();
    assert_eq!(recv(&mut alice).await, "welcome user1");

    bob.send("say hello").await.unwrap();
    assert_eq!(recv(&mut alice).await, "guest: hello");

    alice.send("say hi bob\r").await.unwrap();
    assert_eq!(recv(&mut bob).await, "user1: hi bob");

    bob.send("connect user2 wrong").await.unwrap();
    assert_eq!(recv(&mut bob).await, "invalid credentials");

    bob.send("wave").await.unwrap();
    assert_eq!(recv(&mut bob).await, "wave: unknown command");
}

#[tokio::test]
async fn test_disconnected_client_leaves_registry() {
    let (addr, registry) = start().await;

    let mut alice = connect(addr).await;
    let bob = connect(addr).await;
    wait_for_sessions(&registry, 2).await;

    drop(bob);
    wait_for_sessions(&registry, 1).await;

    // The remaining session keeps working
    alice.send("disconnect").await.unwrap();
    assert_eq!(recv(&mut alice).await, "you are not connected");
}

#[tokio::test]
async fn test_concurrent_says_reach_every_listener() {
    const SPEAKERS: usize = 3;
    const LISTENERS: usize = 2;
    const MESSAGES: usize = 5;

    let (addr, registry) = start().await;

    let mut listeners = Vec::new();
    for _ in 0..LISTENERS {
        listeners.push(connect(addr).await);
    }
    let mut speakers = Vec::new();
    for _ in 0..SPEAKERS {
        speakers.push(connect(addr).await);
    }
    wait_for_sessions(&registry, SPEAKERS + LISTENERS).await;

    let tasks: Vec<_> = speakers
        .into_iter()
        .enumerate()
        .map(|(s, mut speaker)| {
            tokio::spawn(async move {
                for m in 0..MESSAGES {
                    speaker.send(format!("say {}-{}", s, m)).await.unwrap();
                }
                speaker
            })
        })
        .collect();

    let mut speakers = Vec::new();
    for task in tasks {
        speakers.push(task.await.unwrap());
    }

    for listener in listeners.iter_mut() {
        let mut lines = Vec::new();
        for _ in 0..SPEAKERS * MESSAGES {
            lines.push(recv(listener).await);
        }
        lines.sort();

        let mut expected: Vec<_> = (0..SPEAKERS)
            .flat_map(|s| (0..MESSAGES).map(move |m| format!("guest: {}-{}", s, m)))
            .collect();
        expected.sort();
        assert_eq!(lines, expected);
    }
}
