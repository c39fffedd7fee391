//! Counter Propagation
//!
//! Pushes a counter value to every known peer's `/sync` endpoint.
//!
//! ## Delivery rules
//! - Peers are contacted concurrently; the caller awaits the whole round.
//! - Each peer gets up to `RetryPolicy::attempts` tries. Before try `i + 1` the sender
//!   waits `i * backoff_unit` (1s, then 2s with the defaults).
//! - Only a 2xx answer counts as delivered.
//! - A peer that fails every try is evicted from the registry. Sustained
//!   unreachability is treated the same as a dead peer.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use super::protocol::{ENDPOINT_SYNC, SyncRequest};
use crate::membership::registry::PeerRegistry;
use crate::membership::types::NodeId;
use crate::transport::{PeerClient, PeerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    /// Wait between attempt `attempt` (1-indexed) and the next one.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

/// Outcome of one propagation round.
#[derive(Debug, Default, Clone)]
pub struct PropagationReport {
    pub delivered: Vec<NodeId>,
    pub evicted: Vec<NodeId>,
}

pub struct PropagationEngine {
    registry: Arc<PeerRegistry>,
    client: PeerClient,
    policy: RetryPolicy,
}

impl PropagationEngine {
    pub fn new(registry: Arc<PeerRegistry>, client: PeerClient, policy: RetryPolicy) -> Arc<Self> {
        Arc::new(Self {
            registry,
            client,
            policy,
        })
    }

    /// Sends `value` to every peer in the current snapshot and waits for all of them to
    /// either accept it or be evicted.
    pub async fn propagate(&self, value: u64) -> PropagationReport {
        let peers = self.registry.snapshot();
        let mut report = PropagationReport::default();

        if peers.is_empty() {
            tracing::debug!("No peers to propagate counter {} to", value);
            return report;
        }

        let mut round = JoinSet::new();
        for peer in peers {
            let client = self.client.clone();
            let policy = self.policy;
            round.spawn(async move {
                let outcome = deliver(&client, &peer, value, policy).await;
                (peer, outcome)
            });
        }

        while let Some(joined) = round.join_next().await {
            match joined {
                Ok((peer, Ok(attempt))) => {
                    tracing::debug!("Counter {} synced to {} on attempt {}", value, peer, attempt);
                    report.delivered.push(peer);
                }
                Ok((peer, Err(e))) => {
                    tracing::warn!(
                        "Could not propagate counter {} to {}, evicting it: {}",
                        value,
                        peer,
                        e
                    );
                    self.registry.remove(&peer);
                    report.evicted.push(peer);
                }
                Err(e) => {
                    tracing::error!("Propagation task failed: {}", e);
                }
            }
        }

        report
    }
}

/// Delivers `value` to one peer. Returns the attempt number that succeeded, or the
/// error from the last attempt.
async fn deliver(
    client: &PeerClient,
    peer: &NodeId,
    value: u64,
    policy: RetryPolicy,
) -> Result<u32, PeerError> {
    let payload = SyncRequest { count: value };
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        tracing::debug!(
            "Propagating counter {} to {} (attempt {}/{})",
            value,
            peer,
            attempt,
            attempts
        );

        match client.post_json(peer, ENDPOINT_SYNC, &payload).await {
            Ok(_) => return Ok(attempt),
            Err(e) => {
                if attempt >= attempts {
                    return Err(e);
                }
                tracing::debug!("Attempt {} to {} failed: {}", attempt, peer, e);
                tokio::time::sleep(policy.delay_after(attempt)).await;
                attempt += 1;
            }
        }
    }
}
