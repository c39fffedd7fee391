//! Peer Health Checker
//!
//! Every `interval` the checker probes `GET /health` on each known peer. A probe that
//! times out, fails to connect or gets a non-2xx answer evicts the peer at once; there
//! is no retry and no suspect state. An evicted peer comes back only through discovery
//! or registration.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use super::protocol::ENDPOINT_HEALTH;
use super::registry::PeerRegistry;
use super::types::NodeId;
use crate::transport::{PeerClient, PeerError};

pub struct HealthChecker {
    registry: Arc<PeerRegistry>,
    client: PeerClient,
    interval: Duration,
}

impl HealthChecker {
    pub fn new(registry: Arc<PeerRegistry>, client: PeerClient, interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            registry,
            client,
            interval,
        })
    }

    pub async fn start(self: Arc<Self>) {
        tracing::info!(
            "Starting health checker (interval {:?}, probe timeout {:?})",
            self.interval,
            self.client.timeout()
        );

        tokio::spawn(async move {
            self.health_loop().await;
        });
    }

    async fn health_loop(&self) {
        loop {
            tokio::time::sleep(self.interval).await;

            let evicted = self.sweep().await;
            if !evicted.is_empty() {
                tracing::info!(
                    "Health sweep evicted {} peer(s), {} remaining",
                    evicted.len(),
                    self.registry.len()
                );
            }
        }
    }

    /// Probes every peer in the current snapshot concurrently and evicts the ones that
    /// fail. Returns the evicted peers.
    pub async fn sweep(&self) -> Vec<NodeId> {
        let peers = self.registry.snapshot();
        let mut probes = JoinSet::new();

        for peer in peers {
            let client = self.client.clone();
            probes.spawn(async move {
                let outcome = probe(&client, &peer).await;
                (peer, outcome)
            });
        }

        let mut evicted = Vec::new();
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((peer, Ok(()))) => {
                    tracing::trace!("Peer {} is healthy", peer);
                }
                Ok((peer, Err(e))) => {
                    tracing::warn!("Removed dead peer {}: {}", peer, e);
                    self.registry.remove(&peer);
                    evicted.push(peer);
                }
                Err(e) => {
                    tracing::error!("Health probe task failed: {}", e);
                }
            }
        }

        evicted
    }
}

async fn probe(client: &PeerClient, peer: &NodeId) -> Result<(), PeerError> {
    client.get(peer, ENDPOINT_HEALTH).await.map(|_| ())
}
