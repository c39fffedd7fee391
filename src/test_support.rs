//! Helpers shared by the unit test modules: throwaway HTTP peers on ephemeral ports.

use axum::Router;
use std::future::Future;
use std::time::Duration;

use crate::membership::types::NodeId;

/// Serves `router` on `127.0.0.1:0` and returns the peer id to reach it.
pub async fn spawn_peer(router: Router) -> NodeId {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    NodeId::new(addr.to_string())
}

/// A peer id nobody listens on: the port was bound once and then released.
pub async fn unreachable_peer() -> NodeId {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    NodeId::new(addr.to_string())
}

/// Polls `condition` until it holds or `timeout` elapses. Returns the final result.
pub async fn wait_until<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        if condition().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
