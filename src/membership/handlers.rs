use axum::{Extension, Json, body::Bytes, http::StatusCode};
use std::sync::Arc;

use super::protocol::{DiscoveryResponse, HealthResponse, PeerRequest};
use super::registry::PeerRegistry;
use super::types::NodeId;

/// Bodies are decoded by hand so that anything unparsable, whatever its content type,
/// is answered with 400.
fn parse_peer_request(body: &Bytes) -> Option<NodeId> {
    match serde_json::from_slice::<PeerRequest>(body) {
        Ok(req) if !req.id.is_empty() => Some(req.id),
        Ok(_) => {
            tracing::warn!("Rejected peer request with empty id");
            None
        }
        Err(e) => {
            tracing::warn!("Rejected malformed peer request: {}", e);
            None
        }
    }
}

pub async fn handle_register(
    Extension(registry): Extension<Arc<PeerRegistry>>,
    body: Bytes,
) -> StatusCode {
    let Some(peer_id) = parse_peer_request(&body) else {
        return StatusCode::BAD_REQUEST;
    };

    if &peer_id == registry.local_id() {
        return StatusCode::OK;
    }

    if registry.add(peer_id.clone()) {
        tracing::info!("Registered new peer: {}", peer_id);
    }

    StatusCode::OK
}

pub async fn handle_get_peers(
    Extension(registry): Extension<Arc<PeerRegistry>>,
) -> (StatusCode, Json<Vec<NodeId>>) {
    (StatusCode::OK, Json(registry.snapshot()))
}

pub async fn handle_remove_peer(
    Extension(registry): Extension<Arc<PeerRegistry>>,
    body: Bytes,
) -> StatusCode {
    let Some(peer_id) = parse_peer_request(&body) else {
        return StatusCode::BAD_REQUEST;
    };

    if registry.remove(&peer_id) {
        tracing::info!("Removed peer: {}", peer_id);
    }

    StatusCode::OK
}

pub async fn handle_health(
    Extension(registry): Extension<Arc<PeerRegistry>>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse::ok(registry.local_id().clone())),
    )
}

pub async fn handle_discovery(
    Extension(registry): Extension<Arc<PeerRegistry>>,
) -> (StatusCode, Json<DiscoveryResponse>) {
    (
        StatusCode::OK,
        Json(DiscoveryResponse {
            node_id: registry.local_id().clone(),
            peers: registry.snapshot(),
        }),
    )
}
