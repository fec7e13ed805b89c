//! Node identifiers for the light-path graph.
//!
//! Nodes are plain integers in the graph table (`INNODE` / `OUTNODE`), so
//! [`NodeId`] is a thin newtype over `u32` that keeps them from being mixed up
//! with petgraph's internal indices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a point in the optical path.
///
/// Node numbers are non-negative. Stores that keep them in wider signed
/// columns reject anything outside `u32` on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Node every observation mode starts resolving from.
pub const ENTRY_NODE: NodeId = NodeId(1);

/// Node where every complete light path ends.
pub const SINK_NODE: NodeId = NodeId(999);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        NodeId(value)
    }
}
