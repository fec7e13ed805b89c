//! In-memory implementation of [`TableStore`].
//!
//! [`InMemoryStore`] backs tests and one-shot runs that should not touch
//! disk. Semantics match the SQLite backend.

use thruput_core::{ComponentRow, GraphRow};

use crate::error::StorageError;
use crate::traits::TableStore;

/// Tables held in plain vectors.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    graph_rows: Vec<GraphRow>,
    component_rows: Vec<ComponentRow>,
    fingerprint: Option<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableStore for InMemoryStore {
    fn save_tables(
        &mut self,
        graph_rows: &[GraphRow],
        component_rows: &[ComponentRow],
        fingerprint: &str,
    ) -> Result<(), StorageError> {
        self.graph_rows = graph_rows.to_vec();
        self.component_rows = component_rows.to_vec();
        self.fingerprint = Some(fingerprint.to_string());
        Ok(())
    }

    fn load_graph_rows(&self) -> Result<Vec<GraphRow>, StorageError> {
        Ok(self.graph_rows.clone())
    }

    fn load_component_rows(&self) -> Result<Vec<ComponentRow>, StorageError> {
        Ok(self.component_rows.clone())
    }

    fn fingerprint(&self) -> Result<Option<String>, StorageError> {
        Ok(self.fingerprint.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_has_no_fingerprint() {
        let store = InMemoryStore::new();
        assert_eq!(store.fingerprint().unwrap(), None);
        assert!(store.load_graph_rows().unwrap().is_empty());
    }

    #[test]
    fn save_replaces_previous_tables() {
        let mut store = InMemoryStore::new();
        store
            .save_tables(&[GraphRow::new("a", "default", 1, 2)], &[], "one")
            .unwrap();
        store
            .save_tables(&[GraphRow::new("b", "default", 1, 2)], &[], "two")
            .unwrap();
        let rows = store.load_graph_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].compname, "b");
        assert_eq!(store.fingerprint().unwrap().as_deref(), Some("two"));
    }
}
