//! Helpers shared by the integration tests: nodes and stub peers on ephemeral ports.

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use counter_cluster::config::Timings;
use counter_cluster::counter::propagation::RetryPolicy;
use counter_cluster::counter::protocol::{ENDPOINT_SYNC, SyncRequest};
use counter_cluster::membership::types::NodeId;
use counter_cluster::node::ClusterNode;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub fn fast_timings() -> Timings {
    Timings {
        health_interval: Duration::from_millis(100),
        request_timeout: Duration::from_millis(500),
        broadcast_interval: Duration::from_secs(1),
        report_interval: Duration::from_secs(1),
        retry: RetryPolicy {
            attempts: 3,
            backoff_unit: Duration::from_millis(20),
        },
    }
}

/// Starts a full node on `127.0.0.1:0` with shortened timings.
pub async fn spawn_node() -> ClusterNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local_id = NodeId::new(listener.local_addr().unwrap().to_string());

    let node = ClusterNode::new(local_id, fast_timings());
    let app = node.router();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    node
}

pub async fn spawn_router(router: Router) -> NodeId {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    NodeId::new(addr.to_string())
}

/// A peer id nobody listens on: the port was bound once and then released.
pub async fn dead_peer() -> NodeId {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    NodeId::new(addr.to_string())
}

/// A `/sync` endpoint that records every count it is sent.
pub async fn recording_sync_peer() -> (NodeId, Arc<Mutex<Vec<u64>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();
    let router = Router::new().route(
        ENDPOINT_SYNC,
        post(move |Json(req): Json<SyncRequest>| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(req.count);
                StatusCode::OK
            }
        }),
    );

    (spawn_router(router).await, received)
}

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

pub async fn post_json(node: &ClusterNode, endpoint: &str, body: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(node.local_id().url(endpoint))
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .unwrap()
}
