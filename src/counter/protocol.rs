//! Counter HTTP Protocol
//!
//! Endpoints and DTOs for reading, incrementing and replicating the counter.

use serde::{Deserialize, Serialize};

use crate::membership::types::NodeId;

// --- API Endpoints ---

/// Client endpoint: increment locally, then push the new value to every peer.
pub const ENDPOINT_INCREMENT: &str = "/increment";
/// Client endpoint: read the local value.
pub const ENDPOINT_COUNT: &str = "/count";
/// Internal endpoint: a peer pushes its value here to be merged.
pub const ENDPOINT_SYNC: &str = "/sync";

// --- Data Transfer Objects ---

/// Body of `/sync`. A negative or non-integer count does not parse and is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    pub count: u64,
}

/// Answer to `/increment` and `/count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
    pub node_id: NodeId,
}
