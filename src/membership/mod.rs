//! Membership & Discovery Module
//!
//! Keeps track of which other nodes this node knows about, and how it comes to know them.
//!
//! ## Core Mechanisms
//! - **Registry**: a set of peer ids that never contains the local node. All readers work
//!   on copied snapshots.
//! - **Discovery**: UDP broadcast of the local id, used only to bootstrap registration.
//! - **Registration Exchange**: `/register` followed by `/peers`, applied recursively so
//!   that knowing one peer eventually means knowing every reachable peer.
//! - **Health Checking**: periodic `/health` probes; a failed probe evicts the peer.

pub mod discovery;
pub mod exchange;
pub mod handlers;
pub mod health;
pub mod protocol;
pub mod registry;
pub mod types;
