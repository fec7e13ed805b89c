//! ULTRASPEC: single-channel imager with a filter wheel between its lens
//! barrels.

use super::{filter_edges, Filter, InstrumentGraph, NodeGroup};
use crate::edge::Edge;

const FILTERS: &[Filter] = &[
    ("u", "uspec_u"),
    ("g", "uspec_g"),
    ("r", "uspec_r"),
    ("i", "uspec_i"),
    ("z", "uspec_z"),
    ("kg5", "uspec_kg5"),
    ("bowen", "uspec_bowen"),
    ("n86", "uspec_n86"),
    ("rcont", "uspec_rcont"),
    ("ha_broad", "uspec_ha_broad"),
    ("bcont", "uspec_bcont"),
    ("ha_narrow", "uspec_ha_narrow"),
    ("iz", "uspec_iz"),
    ("NaI", "uspec_nai"),
    ("clear", "uspec_clear"),
];

pub fn graph() -> InstrumentGraph {
    let fixed = vec![
        Edge::new(13, 131, "clear"),
        Edge::new(131, 132, "uspec_barrel3"),
        Edge::new(133, 134, "uspec_barrel2"),
        Edge::new(134, 135, "uspec_barrel1"),
        Edge::new(135, 136, "uspec_window"),
        Edge::new(136, 999, "uspec_ccd"),
    ];

    InstrumentGraph {
        name: "uspec",
        edges: fixed
            .into_iter()
            .chain(filter_edges(132, 133, FILTERS))
            .collect(),
        node_groups: vec![
            NodeGroup::new(&[13, 999], "main"),
            NodeGroup::new(&[131], "barrel3"),
            NodeGroup::new(&[132], "filters"),
            NodeGroup::new(&[133], "barrel2"),
            NodeGroup::new(&[134], "barrel1"),
            NodeGroup::new(&[135], "window"),
            NodeGroup::new(&[136], "CCD"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{mode_set, GraphTable, ModeSet};
    use crate::id::NodeId;

    #[test]
    fn filter_sits_between_barrels() {
        let graph = GraphTable::from_edges(&graph().edges);
        let res = graph.resolve(NodeId(13), &mode_set(["kg5"])).unwrap();
        assert_eq!(
            res.components,
            vec![
                "clear",
                "uspec_barrel3",
                "uspec_kg5",
                "uspec_barrel2",
                "uspec_barrel1",
                "uspec_window",
                "uspec_ccd",
            ]
        );
    }

    #[test]
    fn filter_wheel_has_no_default() {
        let graph = GraphTable::from_edges(&graph().edges);
        match graph.resolve(NodeId(13), &ModeSet::new()).unwrap_err() {
            crate::CoreError::IncompleteGraph { node, available, .. } => {
                assert_eq!(node, NodeId(132));
                assert_eq!(available.len(), FILTERS.len());
            }
            other => panic!("expected IncompleteGraph, got {other:?}"),
        }
    }
}
