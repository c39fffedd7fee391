//! Registration Exchange
//!
//! Turns a one-way sighting of a peer into mutual awareness, and grows the peer set
//! transitively:
//!
//! 1. `POST /register` with our own id.
//! 2. On success, `GET /peers` from the same peer (in a separate task).
//! 3. Every returned id that `PeerRegistry::add` reports as new gets its own exchange.
//!
//! There is no visited set and no depth limit. The chain stops because `add` returns
//! `false` for ids that are already known. Every step is detached; a failed call is
//! logged and ends only its own branch.

use std::sync::Arc;

use super::protocol::{ENDPOINT_PEERS, ENDPOINT_REGISTER, PeerRequest};
use super::registry::PeerRegistry;
use super::types::NodeId;
use crate::transport::{PeerClient, PeerError};

pub struct RegistrationExchange {
    registry: Arc<PeerRegistry>,
    client: PeerClient,
}

impl RegistrationExchange {
    pub fn new(registry: Arc<PeerRegistry>, client: PeerClient) -> Arc<Self> {
        Arc::new(Self { registry, client })
    }

    /// Seeds the registry with the configured initial peers and starts an exchange
    /// with each of them. Returns how many exchanges were launched.
    pub fn bootstrap(self: &Arc<Self>, seeds: Vec<NodeId>) -> usize {
        let added = self.registry.seed(seeds);

        for peer in added.iter() {
            tracing::info!("Added initial peer: {}", peer);
            self.spawn_exchange(peer.clone());
        }

        added.len()
    }

    /// Fire-and-forget exchange with `peer`.
    pub fn spawn_exchange(self: &Arc<Self>, peer: NodeId) {
        let exchange = self.clone();
        tokio::spawn(async move {
            exchange.exchange(peer).await;
        });
    }

    /// Registers with `peer` and, if it accepts, fetches its peer list in the background.
    pub async fn exchange(self: Arc<Self>, peer: NodeId) {
        tracing::debug!("Registering with peer: {}", peer);

        match self.register_with(&peer).await {
            Ok(()) => {
                tracing::info!("Successfully registered with peer: {}", peer);
                self.spawn_fetch(peer);
            }
            Err(e) => {
                tracing::warn!("Failed to register with peer {}: {}", peer, e);
            }
        }
    }

    pub async fn register_with(&self, peer: &NodeId) -> Result<(), PeerError> {
        let payload = PeerRequest {
            id: self.registry.local_id().clone(),
        };

        self.client
            .post_json(peer, ENDPOINT_REGISTER, &payload)
            .await
            .map(|_| ())
    }

    pub async fn fetch_peers_from(&self, peer: &NodeId) -> Result<Vec<NodeId>, PeerError> {
        let response = self.client.get(peer, ENDPOINT_PEERS).await?;

        response
            .json::<Vec<NodeId>>()
            .await
            .map_err(|source| PeerError::Request {
                peer: peer.clone(),
                source,
            })
    }

    fn spawn_fetch(self: &Arc<Self>, peer: NodeId) {
        let exchange = self.clone();
        tokio::spawn(async move {
            match exchange.fetch_peers_from(&peer).await {
                Ok(peers) => {
                    let added = exchange.ingest(&peer, peers);
                    tracing::debug!("Learned {} new peer(s) from {}", added.len(), peer);
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch peers from {}: {}", peer, e);
                }
            }
        });
    }

    /// Adds every unknown id from `peers` and launches an exchange with each of them.
    /// Returns the ids that were new.
    pub fn ingest(self: &Arc<Self>, source: &NodeId, peers: Vec<NodeId>) -> Vec<NodeId> {
        let mut added = Vec::new();

        for candidate in peers {
            if candidate.is_empty() || &candidate == self.registry.local_id() {
                continue;
            }

            if self.registry.add(candidate.clone()) {
                tracing::info!("Discovered new peer via {}: {}", source, candidate);
                self.spawn_exchange(candidate.clone());
                added.push(candidate);
            }
        }

        added
    }
}
