//! ULTRACAM: three-channel imager. Two dichroics split the beam into blue,
//! green and red arms, each with its own camera optics, filter and CCD.

use super::{channel_edges, filter_edges, Filter, InstrumentGraph, NodeGroup};
use crate::edge::Edge;

const BLUE: &[Filter] = &[
    ("u", "ucam_u"),
    ("3500_nb", "ucam_3500_nb"),
    ("u_s", "ucam_u_s"),
];

const GREEN: &[Filter] = &[
    ("g", "ucam_g"),
    ("g_s", "ucam_g_s"),
    ("4170_nb", "ucam_4170_nb"),
    ("bowen", "ucam_bowen"),
    ("bcont", "ucam_bcont"),
];

const RED: &[Filter] = &[
    ("r", "ucam_r"),
    ("i", "ucam_i"),
    ("z", "ucam_z"),
    ("r_s", "ucam_r_s"),
    ("i_s", "ucam_i_s"),
    ("z_s", "ucam_z_s"),
    ("clear", "ucam_clear"),
    ("rcont", "ucam_rcont"),
    ("NaI", "ucam_nai"),
    ("ha_broad", "ucam_ha_broad"),
    ("ha_narrow", "ucam_ha_narrow"),
    ("iz", "ucam_iz"),
];

pub fn graph() -> InstrumentGraph {
    let fixed = vec![
        Edge::keyed(11, 111, "clear", "vlt"),
        Edge::keyed(11, 112, "clear", "wht"),
        Edge::keyed(11, 113, "clear", "ntt"),
        Edge::new(111, 114, "ucam_coll_vlt"),
        Edge::new(112, 114, "ucam_coll_wht"),
        Edge::new(113, 114, "ucam_coll_ntt"),
        Edge::keyed(113, 114, "ucam_coll_ntt_old", "old"),
        Edge::new(114, 115, "ucam_dich1_trans"),
        Edge::new(115, 118, "ucam_dich2_trans"),
        Edge::new(118, 119, "ucam_cam_red"),
        Edge::new(117, 119, "ucam_cam_grn"),
        Edge::new(116, 119, "ucam_cam_bl"),
        Edge::new(120, 121, "ucam_ccd_windows"),
    ];

    let wheel = [BLUE, GREEN, RED]
        .into_iter()
        .flat_map(|filters| filter_edges(119, 120, filters));

    let blue = channel_edges(114, 116, "ucam_dich1_reflec", BLUE)
        .chain(channel_edges(121, 999, "ucam_ccd_blu", BLUE));
    let green = channel_edges(115, 117, "ucam_dich2_reflec", GREEN)
        .chain(channel_edges(121, 999, "ucam_ccd_grn", GREEN));
    let red = channel_edges(121, 999, "ucam_ccd_red", RED);

    InstrumentGraph {
        name: "ucam",
        edges: fixed
            .into_iter()
            .chain(wheel)
            .chain(blue)
            .chain(green)
            .chain(red)
            .collect(),
        node_groups: vec![
            NodeGroup::new(&[11, 999], "main"),
            NodeGroup::new(&[111, 112, 113], "collimator"),
            NodeGroup::new(&[114], "dichroic #1"),
            NodeGroup::new(&[115], "dichroic #2"),
            NodeGroup::new(&[116, 117, 118], "cameras"),
            NodeGroup::new(&[119], "filters"),
            NodeGroup::new(&[120], "CCD windows"),
            NodeGroup::new(&[121], "CCDs"),
        ],
    }
}
