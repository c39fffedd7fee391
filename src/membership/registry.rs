//! Peer Registry
//!
//! The set of peers this node currently knows about. Every other component reads it
//! through `snapshot()`, which copies the members out, so iteration never races with
//! concurrent inserts or evictions.

use dashmap::DashSet;
use std::sync::Arc;

use super::types::NodeId;

pub struct PeerRegistry {
    local_id: NodeId,
    peers: DashSet<NodeId>,
}

impl PeerRegistry {
    pub fn new(local_id: NodeId) -> Arc<Self> {
        Arc::new(Self {
            local_id,
            peers: DashSet::new(),
        })
    }

    pub fn local_id(&self) -> &NodeId {
        &self.local_id
    }

    /// Inserts `id` unless it is already known or is the local node.
    ///
    /// Returns `true` only for the call that actually inserted the peer. The check and
    /// the insert happen under a single shard lock, so when many tasks race to add the
    /// same id exactly one of them sees `true`. Callers use that return value to decide
    /// whether to start a registration exchange.
    pub fn add(&self, id: NodeId) -> bool {
        if id == self.local_id {
            return false;
        }

        self.peers.insert(id)
    }

    /// Removes `id` if present. Returns whether it was present.
    pub fn remove(&self, id: &NodeId) -> bool {
        self.peers.remove(id).is_some()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.peers.contains(id)
    }

    /// Point-in-time copy of the peer set, sorted for stable output.
    pub fn snapshot(&self) -> Vec<NodeId> {
        let mut peers: Vec<NodeId> = self.peers.iter().map(|entry| entry.key().clone()).collect();
        peers.sort();
        peers
    }

    /// Adds each of `ids` and returns the ones that were newly inserted.
    pub fn seed(&self, ids: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
        ids.into_iter()
            .filter(|id| self.add(id.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
