//! Built-in light-path graphs.
//!
//! Each instrument is pure data: a list of [`Edge`]s plus descriptive
//! [`NodeGroup`]s. The shared telescope path starts at [`ENTRY_NODE`], each
//! instrument branches off it, and every complete path ends at
//! [`SINK_NODE`]. Filter wheels are expanded into one edge per filter, and
//! optics that depend on the filter's colour channel (dichroics, cameras,
//! CCDs) get one keyword per filter in that channel.

pub mod common;
pub mod hcam;
pub mod ucam;
pub mod uspec;

use crate::edge::{Edge, GraphRow};
use crate::graph::GraphTable;
use crate::id::{NodeId, ENTRY_NODE, SINK_NODE};

/// Filter wheel slot: obsmode keyword and throughput component.
pub type Filter = (&'static str, &'static str);

/// Labelled set of nodes, used only for documentation and diagrams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroup {
    pub nodes: Vec<NodeId>,
    pub label: &'static str,
}

impl NodeGroup {
    pub fn new(nodes: &[u32], label: &'static str) -> Self {
        NodeGroup {
            nodes: nodes.iter().copied().map(NodeId).collect(),
            label,
        }
    }
}

/// Light-path graph of one instrument (or of the shared telescope path).
#[derive(Debug, Clone)]
pub struct InstrumentGraph {
    pub name: &'static str,
    pub edges: Vec<Edge>,
    pub node_groups: Vec<NodeGroup>,
}

impl InstrumentGraph {
    /// Flattened graph table rows, one per (edge, keyword).
    pub fn table_rows(&self) -> impl Iterator<Item = GraphRow> + '_ {
        self.edges.iter().flat_map(|edge| edge.to_table_rows())
    }
}

/// Edges from `in_node` to `out_node` through each filter, keyed by the
/// filter name.
fn filter_edges(in_node: u32, out_node: u32, filters: &[Filter]) -> impl Iterator<Item = Edge> + '_ {
    filters
        .iter()
        .map(move |&(keyword, component)| Edge::keyed(in_node, out_node, component, keyword))
}

/// One `component` edge per filter of a colour channel.
fn channel_edges<'a>(
    in_node: u32,
    out_node: u32,
    component: &'a str,
    filters: &'a [Filter],
) -> impl Iterator<Item = Edge> + 'a {
    filters
        .iter()
        .map(move |&(keyword, _)| Edge::keyed(in_node, out_node, component, keyword))
}

/// Every built-in graph, shared telescope path first.
pub fn all() -> Vec<InstrumentGraph> {
    vec![common::graph(), ucam::graph(), hcam::graph(), uspec::graph()]
}

/// Graph table rows for every instrument, stably sorted by in node.
pub fn graph_rows() -> Vec<GraphRow> {
    let mut rows: Vec<GraphRow> = all().iter().flat_map(|g| g.table_rows().collect::<Vec<_>>()).collect();
    rows.sort_by_key(|row| row.innode);
    rows
}

/// The resolver graph for all built-in instruments, with the sink set.
pub fn builtin_graph() -> GraphTable {
    GraphTable::from_rows(graph_rows()).with_sink(SINK_NODE)
}

/// Start node for every built-in obsmode.
pub fn entry_node() -> NodeId {
    ENTRY_NODE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{mode_set, ModeSet};

    #[test]
    fn rows_sorted_by_in_node() {
        let rows = graph_rows();
        assert!(rows.windows(2).all(|w| w[0].innode <= w[1].innode));
        assert_eq!(rows[0].innode, NodeId(1));
    }

    #[test]
    fn every_instrument_reaches_the_sink() {
        let graph = builtin_graph();
        for obsmode in [
            ["ucam", "wht", "g"],
            ["ucam", "ntt", "u"],
            ["ucam", "vlt", "r"],
            ["hcam", "gtc", "z"],
            ["hcam", "wht", "i"],
            ["uspec", "tnt", "r"],
        ] {
            let res = graph.resolve(entry_node(), &mode_set(obsmode)).unwrap();
            assert_eq!(res.path.last(), Some(&SINK_NODE), "{obsmode:?}");
        }
    }

    #[test]
    fn no_modes_fails_at_instrument_choice() {
        let graph = builtin_graph();
        let err = graph.resolve(entry_node(), &ModeSet::new()).unwrap_err();
        assert!(matches!(err, crate::CoreError::IncompleteGraph { .. }));
    }

    #[test]
    fn node_groups_are_descriptive() {
        let ucam = ucam::graph();
        assert!(ucam.node_groups.iter().any(|g| g.label == "collimator"));
    }
}
