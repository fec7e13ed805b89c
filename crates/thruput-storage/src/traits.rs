//! The [`TableStore`] trait: persistence contract for the graph and
//! component tables.
//!
//! Both tables are always replaced together with the fingerprint of the
//! graph rows they were built from, so a reader never sees a graph table
//! from one install next to a component table from another.

use thruput_core::{ComponentRow, GraphRow};

use crate::error::StorageError;

/// Storage backend for the installed tables.
///
/// Synchronous; the tables are written once at install time and read many
/// times afterwards.
pub trait TableStore {
    // -------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------

    /// Replaces both tables and the stored fingerprint atomically.
    fn save_tables(
        &mut self,
        graph_rows: &[GraphRow],
        component_rows: &[ComponentRow],
        fingerprint: &str,
    ) -> Result<(), StorageError>;

    // -------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------

    /// Graph table rows in the order they were saved.
    fn load_graph_rows(&self) -> Result<Vec<GraphRow>, StorageError>;

    /// Component table rows in the order they were saved.
    fn load_component_rows(&self) -> Result<Vec<ComponentRow>, StorageError>;

    /// Fingerprint of the installed graph rows, `None` before the first
    /// install.
    fn fingerprint(&self) -> Result<Option<String>, StorageError>;
}
