//! Building, checking and reading the installed tables.
//!
//! [`install_tables`] flattens the built-in instrument graphs into the graph
//! table, derives one component row per distinct component, and saves both
//! with the graph fingerprint. [`ensure_tables`] reinstalls only when the
//! store is empty or its fingerprint no longer matches the built-in graphs.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use thruput_core::instruments;
use thruput_core::{ComponentCatalog, ComponentRow, GraphTable, SINK_NODE};

use crate::config::ThruputConfig;
use crate::error::StorageError;
use crate::hash::fingerprint;
use crate::traits::TableStore;

/// Comment stored on every installed component row.
pub const COMPONENT_COMMENT: &str = "ultracam group throughput";

/// Install timestamp as stored in the component table, e.g.
/// `mar 04 2024 17:02:11`.
pub fn install_time() -> String {
    chrono::Local::now()
        .format("%b %d %Y %H:%M:%S")
        .to_string()
        .to_lowercase()
}

/// One row per distinct curve-carrying component of `graph`, sorted by name.
pub fn component_rows(graph: &GraphTable, time: &str) -> Vec<ComponentRow> {
    graph
        .components()
        .into_iter()
        .map(|compname| ComponentRow {
            time: time.to_string(),
            filename: format!("{compname}.txt"),
            compname,
            comment: COMPONENT_COMMENT.to_string(),
        })
        .collect()
}

/// Rebuilds both tables from the built-in graphs. Returns the fingerprint
/// that was stored.
pub fn install_tables<S: TableStore + ?Sized>(store: &mut S) -> Result<String, StorageError> {
    let rows = instruments::graph_rows();
    let graph = GraphTable::from_rows(rows.clone());
    let components = component_rows(&graph, &install_time());
    let fp = fingerprint(&rows)?;

    store.save_tables(&rows, &components, &fp)?;
    tracing::info!(
        graph_rows = rows.len(),
        component_rows = components.len(),
        fingerprint = %fp,
        "installed throughput tables"
    );
    Ok(fp)
}

/// Installs the tables if they are missing or stale. Returns `true` when an
/// install happened.
pub fn ensure_tables<S: TableStore + ?Sized>(store: &mut S) -> Result<bool, StorageError> {
    let expected = fingerprint(&instruments::graph_rows())?;
    match store.fingerprint()? {
        Some(stored) if stored == expected => Ok(false),
        Some(stored) => {
            tracing::info!(%stored, %expected, "graph tables are stale, reinstalling");
            install_tables(store)?;
            Ok(true)
        }
        None => {
            install_tables(store)?;
            Ok(true)
        }
    }
}

/// Reads the installed graph table, with the sink set.
pub fn load_graph_table<S: TableStore + ?Sized>(store: &S) -> Result<GraphTable, StorageError> {
    let rows = store.load_graph_rows()?;
    if rows.is_empty() {
        return Err(StorageError::IntegrityError {
            reason: "graph table is empty; run install first".to_string(),
        });
    }
    Ok(GraphTable::from_rows(rows).with_sink(SINK_NODE))
}

/// Reads the installed component table, resolving files against the
/// configured data directory.
pub fn load_catalog<S: TableStore + ?Sized>(
    store: &S,
    config: &ThruputConfig,
) -> Result<ComponentCatalog, StorageError> {
    let rows = store.load_component_rows()?;
    Ok(ComponentCatalog::from_rows(rows, config.data_dir()))
}

/// Every keyword usable in an obsmode, excluding `default`.
pub fn list_keywords<S: TableStore + ?Sized>(store: &S) -> Result<BTreeSet<String>, StorageError> {
    Ok(load_graph_table(store)?.keywords())
}

/// Copies every catalogued curve file into `<library>/comp/ucam/`.
///
/// The library directory must already exist; its `comp/ucam` subdirectory
/// is created on demand. Returns the destination paths.
pub fn install_curves<S: TableStore + ?Sized>(
    store: &S,
    config: &ThruputConfig,
) -> Result<Vec<PathBuf>, StorageError> {
    let library = config
        .library_dir()
        .ok_or_else(|| StorageError::Config {
            reason: format!("{} is not set", crate::config::LIBRARY_VAR),
        })?;
    if !library.is_dir() {
        return Err(StorageError::LibraryDir {
            path: library.to_path_buf(),
        });
    }

    let target = library.join("comp").join("ucam");
    fs::create_dir_all(&target).map_err(|e| StorageError::io(&target, e))?;

    let mut copied = Vec::new();
    for row in store.load_component_rows()? {
        let source = config.data_dir().join(&row.filename);
        let dest = target.join(&row.filename);
        fs::copy(&source, &dest).map_err(|e| StorageError::io(&source, e))?;
        tracing::debug!(from = %source.display(), to = %dest.display(), "copied curve");
        copied.push(dest);
    }
    tracing::info!(count = copied.len(), target = %target.display(), "installed curve files");
    Ok(copied)
}
