//! GraphTable: the read-only light-path graph and the mode resolver.
//!
//! [`GraphTable`] is built once from the flattened graph table rows and then
//! shared by every resolution. Rows with the same in node, out node and
//! components describe one physical edge and are merged, so the object graph
//! and the flattened table stay equivalent.
//!
//! # Resolution
//!
//! [`GraphTable::resolve`] walks the graph from a start node. At each node it
//! takes the single edge selected by a requested mode, otherwise the default
//! edge. The walk fails on:
//! - a node where no requested mode matches and no default edge exists
//! - a node where requested modes select two or more distinct edges
//! - a dead end that is not the designated sink
//! - requested modes that no visited edge consumed
//!
//! Self-referencing edges stop the walk after [`MAX_STALL`] consecutive
//! steps without an error; any longer cycle is reported as
//! [`CoreError::CyclicPath`] since selection at a node is deterministic.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::edge::{Edge, GraphRow, Keywords, CLEAR, DEFAULT_KEYWORD};
use crate::error::CoreError;
use crate::id::NodeId;

/// Requested modes of one resolution. Ordered so that error messages and
/// iteration never depend on hashing.
pub type ModeSet = BTreeSet<String>;

/// Consecutive self-referencing steps tolerated before the walk stops.
pub const MAX_STALL: usize = 3;

/// Edge weight stored in the petgraph graph.
#[derive(Debug, Clone)]
struct PathEdge {
    component: String,
    thermal_component: String,
    keywords: Keywords,
    /// Extra occurrences of keywords already in `keywords`, one entry per
    /// duplicated row. A requested keyword listed here is ambiguous.
    repeated: Keywords,
    /// Position of the first contributing row in the source table.
    order: usize,
}

/// Result of walking the graph for one set of modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Optical components in light-path order.
    pub components: Vec<String>,
    /// Thermal components, parallel to `components`.
    pub thermal_components: Vec<String>,
    /// Requested modes consumed by some edge on the path.
    pub used_modes: ModeSet,
    /// Visited nodes, starting with the start node.
    pub path: Vec<NodeId>,
    /// `true` if the walk stopped on a self-referencing edge.
    pub stalled: bool,
}

/// Edge chosen at a single node.
struct Selection<'a> {
    out_node: NodeId,
    edge: &'a PathEdge,
    matched: Vec<String>,
}

/// The read-only light-path graph.
#[derive(Debug, Clone, Default)]
pub struct GraphTable {
    graph: DiGraph<NodeId, PathEdge, u32>,
    indices: HashMap<NodeId, NodeIndex<u32>>,
    sink: Option<NodeId>,
    row_count: usize,
}

impl GraphTable {
    /// Builds the graph from table rows. All strings are lowercase-folded.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = GraphRow>,
    {
        let mut table = GraphTable::default();
        let mut merged: HashMap<(NodeId, NodeId, String, String), EdgeIndex<u32>> =
            HashMap::new();

        for row in rows {
            let order = table.row_count;
            table.row_count += 1;

            let component = row.compname.trim().to_lowercase();
            let thermal = row.thcompname.trim().to_lowercase();
            let keyword = row.keyword.trim().to_lowercase();
            let key = (row.innode, row.outnode, component.clone(), thermal.clone());

            if let Some(&idx) = merged.get(&key) {
                let edge = &mut table.graph[idx];
                if edge.keywords.contains(&keyword) {
                    tracing::debug!(%keyword, innode = %row.innode, "duplicate graph row");
                    edge.repeated.push(keyword);
                } else {
                    edge.keywords.push(keyword);
                }
                continue;
            }

            let from = table.node_index(row.innode);
            let to = table.node_index(row.outnode);
            let mut keywords = Keywords::new();
            keywords.push(keyword);
            let idx = table.graph.add_edge(
                from,
                to,
                PathEdge {
                    component,
                    thermal_component: thermal,
                    keywords,
                    repeated: Keywords::new(),
                    order,
                },
            );
            merged.insert(key, idx);
        }

        table
    }

    /// Builds the graph from edge records by flattening them into rows first.
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = &'a Edge>,
    {
        let rows: Vec<GraphRow> = edges
            .into_iter()
            .flat_map(|edge| edge.to_table_rows())
            .collect();
        GraphTable::from_rows(rows)
    }

    /// Designates the node every complete walk must end at.
    pub fn with_sink(mut self, sink: NodeId) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Returns the designated sink, if any.
    pub fn sink(&self) -> Option<NodeId> {
        self.sink
    }

    fn node_index(&mut self, node: NodeId) -> NodeIndex<u32> {
        if let Some(&idx) = self.indices.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node);
        self.indices.insert(node, idx);
        idx
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    /// Number of distinct nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of merged edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of rows the table was built from.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// All keywords usable in an obsmode (every keyword except `default`).
    pub fn keywords(&self) -> BTreeSet<String> {
        self.graph
            .edge_weights()
            .flat_map(|e| e.keywords.iter())
            .filter(|k| k.as_str() != DEFAULT_KEYWORD)
            .cloned()
            .collect()
    }

    /// All component names referenced by some edge, excluding `clear`.
    pub fn components(&self) -> BTreeSet<String> {
        self.graph
            .edge_weights()
            .map(|e| e.component.clone())
            .filter(|c| c != CLEAR && !c.is_empty())
            .collect()
    }

    /// Outgoing edges of `node` in table order.
    fn outgoing(&self, node: NodeId) -> Vec<(NodeId, &PathEdge)> {
        let Some(&idx) = self.indices.get(&node) else {
            return Vec::new();
        };
        let mut edges: Vec<(NodeId, &PathEdge)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (self.graph[e.target()], e.weight()))
            .collect();
        edges.sort_by_key(|(_, e)| e.order);
        edges
    }

    /// Non-default keywords available at `node`.
    fn available_keywords(&self, node: NodeId) -> Vec<String> {
        let set: BTreeSet<String> = self
            .outgoing(node)
            .into_iter()
            .flat_map(|(_, e)| e.keywords.iter().cloned())
            .filter(|k| k != DEFAULT_KEYWORD)
            .collect();
        set.into_iter().collect()
    }

    /// Chooses the edge taken at `node`. `Ok(None)` means the node has no
    /// outgoing edges.
    fn select(&self, node: NodeId, modes: &ModeSet) -> Result<Option<Selection<'_>>, CoreError> {
        let candidates = self.outgoing(node);
        if candidates.is_empty() {
            return Ok(None);
        }

        let matches: Vec<(NodeId, &PathEdge, Vec<String>)> = candidates
            .iter()
            .filter_map(|&(out, edge)| {
                let hit: Vec<String> = edge
                    .keywords
                    .iter()
                    .filter(|k| modes.contains(k.as_str()))
                    .cloned()
                    .collect();
                (!hit.is_empty()).then_some((out, edge, hit))
            })
            .collect();

        // Two rows carrying one requested keyword count as two matches even
        // when they were merged into a single edge.
        let duplicated = matches
            .iter()
            .any(|(_, edge, hit)| hit.iter().any(|k| edge.repeated.contains(k)));

        if matches.len() > 1 || duplicated {
            let modes: BTreeSet<String> = matches
                .into_iter()
                .flat_map(|(_, _, hit)| hit)
                .collect();
            return Err(CoreError::AmbiguousMode {
                node,
                modes: modes.into_iter().collect(),
            });
        }

        if let Some((out_node, edge, matched)) = matches.into_iter().next() {
            return Ok(Some(Selection {
                out_node,
                edge,
                matched,
            }));
        }

        let mut defaults = candidates.iter().filter(|(_, e)| {
            e.keywords.iter().any(|k| k == DEFAULT_KEYWORD)
        });
        match defaults.next() {
            Some(&(out_node, edge)) => {
                if defaults.next().is_some() {
                    tracing::debug!(%node, "several default edges, using the first");
                }
                Ok(Some(Selection {
                    out_node,
                    edge,
                    matched: Vec::new(),
                }))
            }
            None => Err(CoreError::IncompleteGraph {
                node,
                modes: modes.iter().cloned().collect(),
                available: self.available_keywords(node),
            }),
        }
    }

    /// Returns the out node selected at `node` for `modes`, or `None` if the
    /// node has no outgoing edges.
    pub fn next_node(&self, modes: &ModeSet, node: NodeId) -> Result<Option<NodeId>, CoreError> {
        Ok(self.select(node, modes)?.map(|s| s.out_node))
    }

    /// Walks the graph from `start`, selecting edges by `modes`.
    pub fn resolve(&self, start: NodeId, modes: &ModeSet) -> Result<Resolution, CoreError> {
        let mut resolution = Resolution {
            components: Vec::new(),
            thermal_components: Vec::new(),
            used_modes: ModeSet::new(),
            path: vec![start],
            stalled: false,
        };
        let mut visited: HashSet<NodeId> = HashSet::from([start]);
        let mut stall = 0;
        let mut node = start;

        loop {
            let Some(selection) = self.select(node, modes)? else {
                tracing::debug!(%node, "no outgoing edges (stop condition)");
                if let Some(sink) = self.sink {
                    if node != sink {
                        return Err(CoreError::IncompleteGraph {
                            node,
                            modes: modes.iter().cloned().collect(),
                            available: Vec::new(),
                        });
                    }
                }
                break;
            };

            tracing::debug!(
                innode = %node,
                outnode = %selection.out_node,
                compname = %selection.edge.component,
                used_default = selection.matched.is_empty(),
                "step"
            );
            resolution.used_modes.extend(selection.matched);
            resolution.components.push(selection.edge.component.clone());
            resolution
                .thermal_components
                .push(selection.edge.thermal_component.clone());

            if selection.out_node == node {
                stall += 1;
                if stall >= MAX_STALL {
                    tracing::debug!(%node, "same outnode {MAX_STALL} times (stop condition)");
                    resolution.stalled = true;
                    break;
                }
                continue;
            }
            stall = 0;

            node = selection.out_node;
            if !visited.insert(node) {
                return Err(CoreError::CyclicPath { node });
            }
            resolution.path.push(node);
        }

        let unused: Vec<String> = modes
            .difference(&resolution.used_modes)
            .cloned()
            .collect();
        if !unused.is_empty() {
            return Err(CoreError::UnusedMode { modes: unused });
        }

        Ok(resolution)
    }

    /// Flattens the graph back into table rows, in table order.
    pub fn to_rows(&self) -> Vec<GraphRow> {
        let mut edges: Vec<(NodeId, NodeId, &PathEdge)> = self
            .graph
            .edge_references()
            .map(|e| (self.graph[e.source()], self.graph[e.target()], e.weight()))
            .collect();
        edges.sort_by_key(|(_, _, e)| e.order);
        edges
            .into_iter()
            .flat_map(|(innode, outnode, e)| {
                e.keywords.iter().chain(&e.repeated).map(move |keyword| GraphRow {
                    compname: e.component.clone(),
                    keyword: keyword.clone(),
                    innode,
                    outnode,
                    thcompname: e.thermal_component.clone(),
                    comment: String::new(),
                })
            })
            .collect()
    }
}

/// Builds a [`ModeSet`] from string slices.
pub fn mode_set<'a, I>(modes: I) -> ModeSet
where
    I: IntoIterator<Item = &'a str>,
{
    modes.into_iter().map(str::to_string).collect()
}
