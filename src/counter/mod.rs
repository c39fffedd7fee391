//! Replicated Counter Module
//!
//! A single integer counter replicated across the cluster with a maximum-wins rule.
//!
//! ## Core Concepts
//! - **Store**: the local value. Moves up by local increments or by adopting a larger
//!   value pushed by a peer; never moves down.
//! - **Propagation**: every change (local increment or accepted merge) is pushed to all
//!   known peers with bounded retries. Re-propagating accepted merges is what carries a
//!   value across nodes that are not directly connected.
//!
//! Maximum-wins means concurrent increments on different nodes are not summed: the
//! cluster converges on the largest value any node has seen.

pub mod handlers;
pub mod propagation;
pub mod protocol;
pub mod store;

#[cfg(test)]
mod tests;
