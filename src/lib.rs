//! Counter Cluster Library
//!
//! Nodes that find each other, keep a shared peer set, and replicate a single counter
//! with a maximum-wins rule. The binary (`main.rs`) only parses configuration and wires
//! these modules together.
//!
//! ## Modules
//! - **`membership`**: peer registry, UDP discovery, the registration exchange that grows
//!   the peer set transitively, and health-based eviction.
//! - **`counter`**: the local counter, its merge rule, and propagation of every change to
//!   all peers with retry and eviction.
//! - **`transport`**: the single-attempt, timeout-bounded HTTP client shared by both.
//! - **`config`**: CLI/env configuration and protocol timings.
//! - **`node`**: assembles one node and its HTTP router.

pub mod config;
pub mod counter;
pub mod membership;
pub mod node;
pub mod transport;

#[cfg(test)]
mod test_support;
