//! HiPERCAM: five-channel imager. Four dichroics split the beam into u, g,
//! r, i and z arms; each arm's filter selects which dichroics reflect and
//! which camera and CCD the light reaches.

use super::{channel_edges, filter_edges, Filter, InstrumentGraph, NodeGroup};
use crate::edge::Edge;

const U: &[Filter] = &[("u", "hcam_u"), ("u_s", "hcam_u_s")];
const G: &[Filter] = &[("g", "hcam_g"), ("g_s", "hcam_g_s")];
const R: &[Filter] = &[("r", "hcam_r"), ("r_s", "hcam_r_s")];
const I: &[Filter] = &[("i", "hcam_i"), ("i_s", "hcam_i_s")];
const Z: &[Filter] = &[("z", "hcam_z"), ("z_s", "hcam_z_s"), ("Y", "hcam_y")];

/// Per-channel optics `(in_node, out_node, component)` taken by every filter
/// of the channel.
const CHANNEL_OPTICS: &[(&[Filter], &[(u32, u32, &str)])] = &[
    (
        U,
        &[
            (1203, 1205, "hcam_dich3_reflec"),
            (1205, 1206, "hcam_dich2_reflec"),
            (1206, 1207, "hcam_dich1_reflec"),
            (1208, 1209, "hcam_cam_u"),
        ],
    ),
    (
        G,
        &[
            (1203, 1205, "hcam_dich3_reflec"),
            (1205, 1206, "hcam_dich2_reflec"),
            (1208, 1210, "hcam_cam_g"),
        ],
    ),
    (
        R,
        &[(1203, 1205, "hcam_dich3_reflec"), (1208, 1211, "hcam_cam_r")],
    ),
    (
        I,
        &[(1204, 1207, "hcam_dich4_reflec"), (1208, 1212, "hcam_cam_i")],
    ),
    (Z, &[(1208, 1213, "hcam_cam_z")]),
];

pub fn graph() -> InstrumentGraph {
    let fixed = vec![
        Edge::keyed(12, 1201, "clear", "gtc"),
        Edge::keyed(12, 1202, "clear", "wht"),
        Edge::new(1201, 1203, "hcam_coll_gtc"),
        Edge::new(1202, 1203, "hcam_coll_wht"),
        Edge::new(1203, 1204, "hcam_dich3_trans"),
        Edge::new(1204, 1207, "hcam_dich4_trans"),
        Edge::new(1205, 1207, "hcam_dich2_trans"),
        Edge::new(1206, 1207, "hcam_dich1_trans"),
        Edge::new(1209, 1214, "clear"),
        Edge::new(1210, 1215, "clear"),
        Edge::new(1211, 1215, "clear"),
        Edge::new(1212, 1216, "clear"),
        Edge::new(1213, 1216, "clear"),
        Edge::new(1214, 1217, "hcam_win_blu"),
        Edge::new(1215, 1218, "hcam_win_grn"),
        Edge::new(1216, 1219, "hcam_win_red"),
        Edge::new(1217, 999, "hcam_ccd_blu"),
        Edge::new(1218, 999, "hcam_ccd_grn"),
        Edge::new(1219, 999, "hcam_ccd_red"),
    ];

    let wheel = [U, G, R, I, Z]
        .into_iter()
        .flat_map(|filters| filter_edges(1207, 1208, filters));

    let channels = CHANNEL_OPTICS.iter().flat_map(|&(filters, optics)| {
        optics
            .iter()
            .flat_map(move |&(in_node, out_node, component)| {
                channel_edges(in_node, out_node, component, filters)
            })
    });

    InstrumentGraph {
        name: "hcam",
        edges: fixed.into_iter().chain(wheel).chain(channels).collect(),
        node_groups: vec![
            NodeGroup::new(&[12, 999], "main"),
            NodeGroup::new(&[1201, 1202], "collimator"),
            NodeGroup::new(&[1203], "dichroic #3"),
            NodeGroup::new(&[1204], "dichroic #4"),
            NodeGroup::new(&[1205], "dichroic #2"),
            NodeGroup::new(&[1206], "dichroic #1"),
            NodeGroup::new(&[1207], "filters"),
            NodeGroup::new(&[1208, 1209, 1210, 1211, 1212, 1213], "cameras"),
            NodeGroup::new(&[1214, 1215, 1216], "CCD windows"),
            NodeGroup::new(&[1217, 1218, 1219], "CCDs"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{mode_set, GraphTable};
    use crate::id::NodeId;

    fn resolve(modes: &[&str]) -> Vec<String> {
        let graph = GraphTable::from_edges(&graph().edges);
        graph
            .resolve(NodeId(12), &mode_set(modes.iter().copied()))
            .unwrap()
            .components
    }

    #[test]
    fn u_band_reflects_off_three_dichroics() {
        assert_eq!(
            resolve(&["gtc", "u"]),
            vec![
                "clear",
                "hcam_coll_gtc",
                "hcam_dich3_reflec",
                "hcam_dich2_reflec",
                "hcam_dich1_reflec",
                "hcam_u",
                "hcam_cam_u",
                "clear",
                "hcam_win_blu",
                "hcam_ccd_blu",
            ]
        );
    }

    #[test]
    fn z_band_transmits_through_dichroics() {
        let comps = resolve(&["wht", "z"]);
        assert_eq!(comps[2], "hcam_dich3_trans");
        assert_eq!(comps[3], "hcam_dich4_trans");
        assert_eq!(comps[4], "hcam_z");
        assert_eq!(comps.last().map(String::as_str), Some("hcam_ccd_red"));
    }

    #[test]
    fn i_band_reflects_off_fourth_dichroic() {
        let comps = resolve(&["gtc", "i_s"]);
        assert_eq!(comps[3], "hcam_dich4_reflec");
        assert_eq!(comps[5], "hcam_cam_i");
    }

    #[test]
    fn two_filters_in_different_arms_are_ambiguous() {
        let graph = GraphTable::from_edges(&graph().edges);
        let err = graph
            .resolve(NodeId(12), &mode_set(["gtc", "u", "z"]))
            .unwrap_err();
        assert!(matches!(err, crate::CoreError::AmbiguousMode { .. }));
    }
}
