//! Core error types for thruput-core.
//!
//! Uses `thiserror` for structured, matchable variants. Resolution errors
//! either describe a bad observation mode (reported to the user verbatim) or
//! inconsistent graph data (a bug in the built-in tables).

use std::path::PathBuf;

use thiserror::Error;

use crate::id::NodeId;

/// Errors produced by the thruput-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Traversal reached a node with no matching edge and no default edge,
    /// or stopped at a dead end that is not the sink.
    #[error("incomplete obsmode {modes:?} at node {node}, choose from {available:?}")]
    IncompleteGraph {
        node: NodeId,
        modes: Vec<String>,
        available: Vec<String>,
    },

    /// Requested modes selected more than one distinct edge at a node.
    #[error("ambiguous obsmode at node {node}: {modes:?} select different edges")]
    AmbiguousMode { node: NodeId, modes: Vec<String> },

    /// Requested modes never consumed along the resolved path.
    #[error("unused keyword(s) {modes:?}")]
    UnusedMode { modes: Vec<String> },

    /// The walk revisited a node through a multi-node cycle.
    #[error("cyclic light path: node {node} revisited")]
    CyclicPath { node: NodeId },

    /// A resolved component has no component table entry.
    #[error("unmatched component: cannot find '{name}' in the component table")]
    UnknownComponent { name: String },

    /// The obsmode names more than one telescope.
    #[error("ambiguous telescope in obsmode: found {found:?}")]
    AmbiguousTelescope { found: Vec<String> },

    /// The obsmode names no known telescope.
    #[error("no telescope in obsmode '{obsmode}'")]
    MissingTelescope { obsmode: String },

    /// A throughput curve file line could not be parsed.
    #[error("curve parse error at {path}:{line}: {reason}")]
    CurveParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A throughput curve has no samples.
    #[error("throughput curve '{name}' has no samples")]
    EmptyCurve { name: String },

    /// Curve wavelengths are not finite and strictly increasing.
    #[error("throughput curve '{name}': wavelengths must be finite and strictly increasing")]
    NotAscending { name: String },

    /// Reading a throughput curve file failed.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
