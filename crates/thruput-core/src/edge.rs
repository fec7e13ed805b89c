//! Edges of the light-path graph and their flattened table form.
//!
//! An [`Edge`] links two nodes through one optical component and is selected
//! by keyword. The persisted graph table stores one [`GraphRow`] per
//! (edge, keyword) pair; [`Edge::to_table_rows`] performs that flattening and
//! [`crate::graph::GraphTable::from_rows`] merges the rows back.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::id::NodeId;

/// Keyword carried by the fallback edge of a node.
pub const DEFAULT_KEYWORD: &str = "default";

/// Component name of a pass-through element with no throughput file.
pub const CLEAR: &str = "clear";

/// Keyword list of an edge. Almost every edge carries one or two keywords.
pub type Keywords = SmallVec<[String; 2]>;

/// Directed link between two nodes, tagged with a component and keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub in_node: NodeId,
    pub out_node: NodeId,
    /// Optical component the light passes through on this edge.
    pub component: String,
    /// Keywords selecting this edge; `["default"]` for the fallback edge.
    pub keywords: Keywords,
    /// Thermal component name. Carried through resolution, never composed.
    pub thermal_component: String,
}

impl Edge {
    /// Creates a default edge.
    pub fn new(in_node: u32, out_node: u32, component: &str) -> Self {
        let mut keywords = Keywords::new();
        keywords.push(DEFAULT_KEYWORD.to_string());
        Edge {
            in_node: NodeId(in_node),
            out_node: NodeId(out_node),
            component: component.to_string(),
            keywords,
            thermal_component: CLEAR.to_string(),
        }
    }

    /// Creates an edge selected by a comma-separated keyword list.
    pub fn keyed(in_node: u32, out_node: u32, component: &str, keywords: &str) -> Self {
        Edge {
            keywords: keywords.split(',').map(|k| k.trim().to_string()).collect(),
            ..Edge::new(in_node, out_node, component)
        }
    }

    /// Returns `true` if this edge is taken when no requested keyword matches.
    pub fn is_default(&self) -> bool {
        self.keywords.iter().any(|k| k == DEFAULT_KEYWORD)
    }

    /// Returns `true` if the component is the clear pass-through.
    pub fn is_clear(&self) -> bool {
        self.component == CLEAR
    }

    /// Flattens the edge into one graph table row per keyword.
    pub fn to_table_rows(&self) -> impl Iterator<Item = GraphRow> + '_ {
        self.keywords.iter().map(move |keyword| GraphRow {
            compname: self.component.clone(),
            keyword: keyword.clone(),
            innode: self.in_node,
            outnode: self.out_node,
            thcompname: self.thermal_component.clone(),
            comment: String::new(),
        })
    }
}

/// One row of the persisted graph table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRow {
    pub compname: String,
    pub keyword: String,
    pub innode: NodeId,
    pub outnode: NodeId,
    pub thcompname: String,
    pub comment: String,
}

impl GraphRow {
    /// Builds a row with a clear thermal component and no comment.
    pub fn new(compname: &str, keyword: &str, innode: u32, outnode: u32) -> Self {
        GraphRow {
            compname: compname.to_string(),
            keyword: keyword.to_string(),
            innode: NodeId(innode),
            outnode: NodeId(outnode),
            thcompname: CLEAR.to_string(),
            comment: String::new(),
        }
    }
}

/// One row of the persisted component table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRow {
    pub time: String,
    pub compname: String,
    pub filename: String,
    pub comment: String,
}
