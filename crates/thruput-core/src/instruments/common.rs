//! Telescope light path shared by every instrument: atmosphere, telescope
//! mirrors, the optional scintillation corrector, and the instrument choice.

use super::{InstrumentGraph, NodeGroup};
use crate::edge::Edge;

pub fn graph() -> InstrumentGraph {
    InstrumentGraph {
        name: "common",
        edges: vec![
            Edge::new(1, 2, "atmos"),
            Edge::keyed(1, 2, "clear", "noatmos"),
            Edge::new(2, 3, "alum"),
            Edge::new(3, 4, "alum"),
            Edge::keyed(3, 6, "alum", "wht"),
            Edge::keyed(4, 5, "alum", "tnt,cube"),
            Edge::new(4, 6, "alum"),
            Edge::new(5, 6, "alum"),
            Edge::keyed(6, 7, "clear", "hcam"),
            Edge::new(6, 10, "clear"),
            Edge::keyed(7, 10, "scint_corr", "scint_corr"),
            Edge::new(7, 10, "clear"),
            Edge::keyed(10, 11, "clear", "ucam"),
            Edge::keyed(10, 12, "clear", "hcam"),
            Edge::keyed(10, 13, "clear", "uspec"),
        ],
        node_groups: vec![
            NodeGroup::new(&[1], "atmosphere"),
            NodeGroup::new(&[2], "1ry"),
            NodeGroup::new(&[3], "2ry"),
            NodeGroup::new(&[4], "3ry"),
            NodeGroup::new(&[5], "4ry"),
            NodeGroup::new(&[6, 7], "scintillation"),
            NodeGroup::new(&[10, 11, 12, 13], "main"),
        ],
    }
}
