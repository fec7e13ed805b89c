//! Persistence for the throughput graph and component tables.
//!
//! Provides the [`TableStore`] trait with [`InMemoryStore`] and
//! [`SqliteStore`] backends, the install step that builds the tables from
//! the built-in instrument graphs, and the directory configuration.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`traits`]: TableStore trait definition
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: migrations and connection setup
//! - [`sqlite`]: SqliteStore implementation
//! - [`hash`]: blake3 fingerprint of the graph rows
//! - [`install`]: install, staleness check, table loading, curve copying
//! - [`config`]: ThruputConfig from environment variables

pub mod config;
pub mod error;
pub mod hash;
pub mod install;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use config::ThruputConfig;
pub use error::StorageError;
pub use hash::fingerprint;
pub use install::{
    component_rows, ensure_tables, install_curves, install_tables, list_keywords, load_catalog,
    load_graph_table,
};
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::TableStore;
