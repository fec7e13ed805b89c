pub mod catalog;
pub mod curve;
pub mod edge;
pub mod error;
pub mod graph;
pub mod id;
pub mod instruments;
pub mod obsmode;
pub mod telescope;

// Re-export commonly used types
pub use catalog::{ComponentCatalog, ComponentFile};
pub use curve::{CurveSource, FileCurveSource, MemoryCurveSource, Sensitivity, ThroughputCurve};
pub use edge::{ComponentRow, Edge, GraphRow, CLEAR, DEFAULT_KEYWORD};
pub use error::CoreError;
pub use graph::{mode_set, GraphTable, ModeSet, Resolution};
pub use id::{NodeId, ENTRY_NODE, SINK_NODE};
pub use obsmode::{compose, parse_modes, ObservationMode};
pub use telescope::Telescope;
