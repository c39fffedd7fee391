//! Peer HTTP Transport
//!
//! Thin wrapper over a shared `reqwest::Client` used for every outbound call a node
//! makes to its peers (registration, peer listing, health probes, counter sync).
//!
//! Each call is a single attempt bounded by a fixed timeout. A response only counts
//! as success when the peer answers with a 2xx status; retry policy, where there is
//! one, lives with the caller.

use serde::Serialize;
use std::time::Duration;

use crate::membership::types::NodeId;

/// Why a call to a peer did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Connection refused, timeout, or a body that could not be decoded.
    #[error("request to {peer} failed: {source}")]
    Request {
        peer: NodeId,
        #[source]
        source: reqwest::Error,
    },

    /// The peer answered, but not with a success status.
    #[error("{peer} answered with status {status}")]
    Status {
        peer: NodeId,
        status: reqwest::StatusCode,
    },
}

#[derive(Debug, Clone)]
pub struct PeerClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl PeerClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        peer: &NodeId,
        endpoint: &str,
        payload: &T,
    ) -> Result<reqwest::Response, PeerError> {
        let response = self
            .http
            .post(peer.url(endpoint))
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| PeerError::Request {
                peer: peer.clone(),
                source,
            })?;

        ensure_success(peer, response)
    }

    pub async fn get(&self, peer: &NodeId, endpoint: &str) -> Result<reqwest::Response, PeerError> {
        let response = self
            .http
            .get(peer.url(endpoint))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| PeerError::Request {
                peer: peer.clone(),
                source,
            })?;

        ensure_success(peer, response)
    }
}

fn ensure_success(peer: &NodeId, response: reqwest::Response) -> Result<reqwest::Response, PeerError> {
    if !response.status().is_success() {
        return Err(PeerError::Status {
            peer: peer.clone(),
            status: response.status(),
        });
    }

    Ok(response)
}
