//! Membership HTTP Protocol
//!
//! Endpoints and DTOs used by nodes to announce themselves, share peer lists and
//! answer liveness probes.

use serde::{Deserialize, Serialize};

use super::types::NodeId;

// --- API Endpoints ---

/// A node announces its own id to a peer.
pub const ENDPOINT_REGISTER: &str = "/register";
/// Snapshot of the peers known to a node, as a JSON array of ids.
pub const ENDPOINT_PEERS: &str = "/peers";
/// Manual removal of a peer from a node's registry.
pub const ENDPOINT_REMOVE_PEER: &str = "/remove-peer";
/// Liveness probe target used by the health checker.
pub const ENDPOINT_HEALTH: &str = "/health";
/// Introspection: the node's id together with its peers.
pub const ENDPOINT_DISCOVERY: &str = "/discovery";

// --- Data Transfer Objects ---

/// Body of `/register` and `/remove-peer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerRequest {
    pub id: NodeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: NodeId,
}

impl HealthResponse {
    pub fn ok(node_id: NodeId) -> Self {
        Self {
            status: "ok".to_string(),
            node_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    pub node_id: NodeId,
    pub peers: Vec<NodeId>,
}
