use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a node, normally its advertised `host:port`.
///
/// The same string is used as the peer-set key, as the address peers dial for HTTP
/// calls, and as the raw discovery datagram payload. It is fixed at process start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Absolute URL of `endpoint` on this node.
    pub fn url(&self, endpoint: &str) -> String {
        format!("http://{}{}", self.0, endpoint)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
