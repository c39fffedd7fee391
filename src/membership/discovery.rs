//! UDP Discovery
//!
//! Best-effort LAN discovery. Two loops share one UDP socket bound to the discovery
//! port:
//!
//! - **Broadcaster**: sends the raw bytes of the local `NodeId` to the broadcast target
//!   every `interval`. No framing, no acknowledgement.
//! - **Listener**: treats every received payload as a candidate `NodeId`. Unknown ids are
//!   added to the registry and handed to the `RegistrationExchange`, which is what
//!   actually makes both sides aware of each other.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;

use super::exchange::RegistrationExchange;
use super::registry::PeerRegistry;
use super::types::NodeId;

const MAX_DATAGRAM_SIZE: usize = 65536;

pub struct DiscoveryService {
    registry: Arc<PeerRegistry>,
    exchange: Arc<RegistrationExchange>,
    socket: Arc<UdpSocket>,
    broadcast_target: SocketAddr,
    interval: Duration,
}

impl DiscoveryService {
    /// Binds the discovery socket. Failing to bind is fatal for the node, so the error
    /// is returned rather than logged.
    pub async fn bind(
        listen_addr: SocketAddr,
        broadcast_target: SocketAddr,
        interval: Duration,
        registry: Arc<PeerRegistry>,
        exchange: Arc<RegistrationExchange>,
    ) -> Result<Arc<Self>> {
        let socket = UdpSocket::bind(listen_addr)
            .await
            .with_context(|| format!("failed to bind discovery socket on {}", listen_addr))?;
        socket
            .set_broadcast(true)
            .context("failed to enable broadcast on discovery socket")?;

        Ok(Arc::new(Self {
            registry,
            exchange,
            socket: Arc::new(socket),
            broadcast_target,
            interval,
        }))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub async fn start(self: Arc<Self>) {
        tracing::info!(
            "Service discovery enabled on {} (broadcasting to {})",
            self.socket
                .local_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| "<unknown>".to_string()),
            self.broadcast_target
        );

        let _broadcast_handle = {
            let service = self.clone();
            tokio::spawn(async move {
                service.broadcast_loop().await;
            })
        };

        let _listen_handle = {
            let service = self.clone();
            tokio::spawn(async move {
                service.listen_loop().await;
            })
        };
    }

    async fn broadcast_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;
            self.broadcast_presence().await;
        }
    }

    /// Sends a single presence announcement.
    pub async fn broadcast_presence(&self) {
        let payload = self.registry.local_id().as_str().as_bytes();

        match self.socket.send_to(payload, self.broadcast_target).await {
            Ok(_) => tracing::debug!("Broadcasted presence to {}", self.broadcast_target),
            Err(e) => tracing::warn!("Failed to broadcast presence: {}", e),
        }
    }

    async fn listen_loop(self: Arc<Self>) {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, src)) => {
                    self.handle_datagram(&buf[..len], src);
                }
                Err(e) => {
                    tracing::error!("Error receiving discovery packet: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }

    /// Processes one discovery payload. Returns the peer id if it was new and an
    /// exchange was launched for it.
    pub fn handle_datagram(&self, payload: &[u8], src: SocketAddr) -> Option<NodeId> {
        let peer_id = match std::str::from_utf8(payload) {
            Ok(id) if !id.is_empty() => NodeId::new(id),
            Ok(_) => {
                tracing::debug!("Ignoring empty discovery packet from {}", src);
                return None;
            }
            Err(e) => {
                tracing::warn!("Ignoring non UTF-8 discovery packet from {}: {}", src, e);
                return None;
            }
        };

        // our own broadcast looped back
        if &peer_id == self.registry.local_id() {
            return None;
        }

        if !self.registry.add(peer_id.clone()) {
            tracing::trace!("Discovery packet from known peer {}", peer_id);
            return None;
        }

        tracing::info!("Discovered new peer via broadcast: {} (from {})", peer_id, src);
        self.exchange.spawn_exchange(peer_id.clone());

        Some(peer_id)
    }
}
