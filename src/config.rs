//! Node Configuration
//!
//! Command-line flags, each with an environment variable fallback, plus the protocol
//! timings that are compiled in but can be shortened by tests or embedding code.

use clap::Parser;
use clap::builder::BoolishValueParser;
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::time::Duration;

use crate::counter::propagation::RetryPolicy;
use crate::membership::types::NodeId;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "counter-node",
    about = "A cluster node that discovers its peers and replicates a shared counter"
)]
pub struct NodeConfig {
    /// HTTP listen port; also the port part of the derived node id.
    #[arg(long, env = "PORT", default_value_t = 8088)]
    pub port: u16,

    /// Comma-separated list of peers (`host:port`) to register with at startup.
    #[arg(long, env = "PEERS", default_value = "")]
    pub peers: String,

    /// UDP port used for discovery broadcasts.
    #[arg(long, env = "DISCOVERY_PORT", default_value_t = 8089)]
    pub discovery_port: u16,

    /// Turn off UDP discovery. Initial peers are still registered with.
    #[arg(long, env = "DISABLE_DISCOVERY", value_parser = BoolishValueParser::new())]
    pub disable_discovery: bool,

    /// Address discovery broadcasts are sent to.
    #[arg(long, env = "BROADCAST_ADDR", default_value = "255.255.255.255")]
    pub broadcast_addr: IpAddr,

    /// Id advertised to peers. Defaults to `<outbound-ip>:<port>`.
    #[arg(long, env = "NODE_ID")]
    pub node_id: Option<String>,

    /// Interface the HTTP and discovery listeners bind to.
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub bind_host: IpAddr,
}

impl NodeConfig {
    pub fn node_id(&self) -> NodeId {
        match &self.node_id {
            Some(id) if !id.trim().is_empty() => NodeId::new(id.trim()),
            _ => derive_node_id(self.port),
        }
    }

    pub fn initial_peers(&self, local_id: &NodeId) -> Vec<NodeId> {
        parse_peer_list(&self.peers, local_id)
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.port)
    }

    pub fn discovery_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.discovery_port)
    }

    pub fn broadcast_target(&self) -> SocketAddr {
        SocketAddr::new(self.broadcast_addr, self.discovery_port)
    }
}

/// Protocol intervals and limits.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    /// Pause between health sweeps.
    pub health_interval: Duration,
    /// Timeout applied to every outbound HTTP call.
    pub request_timeout: Duration,
    /// Pause between discovery broadcasts.
    pub broadcast_interval: Duration,
    /// Pause between status log lines.
    pub report_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            health_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(2),
            broadcast_interval: Duration::from_secs(30),
            report_interval: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// Splits a comma-separated peer list, dropping blanks, duplicates and the local id.
pub fn parse_peer_list(raw: &str, local_id: &NodeId) -> Vec<NodeId> {
    let mut peers: Vec<NodeId> = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let peer = NodeId::new(entry);
        if &peer != local_id && !peers.contains(&peer) {
            peers.push(peer);
        }
    }

    peers
}

/// `<ip>:<port>` where `<ip>` is the address the OS would use to reach the outside
/// world. Connecting a UDP socket sends nothing; it only selects a route.
pub fn derive_node_id(port: u16) -> NodeId {
    match outbound_ip() {
        Some(ip) => NodeId::new(SocketAddr::new(ip, port).to_string()),
        None => NodeId::new(format!("localhost:{}", port)),
    }
}

fn outbound_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();

    if ip.is_unspecified() { None } else { Some(ip) }
}
