//! Table layout of the throughput database.
//!
//! Three tables, created by the embedded migrations:
//!
//! * `graph_rows`: one row per (edge, keyword) of the light-path graph, read
//!   back in insertion order since the first default edge at a node wins.
//! * `component_rows`: component name to curve file name.
//! * `table_meta`: key/value pairs; [`FINGERPRINT_KEY`] holds the blake3
//!   fingerprint of the installed graph rows.
//!
//! The schema version lives in SQLite's `user_version`, managed by
//! `rusqlite_migration`.

use std::path::Path;

use rusqlite::Connection;
use rusqlite_migration::{Migrations, M};

use crate::error::StorageError;

/// Key of the graph fingerprint in `table_meta`.
pub const FINGERPRINT_KEY: &str = "graph_fingerprint";

const SCHEMA: &[M<'static>] = &[M::up(include_str!("migrations/001_initial_schema.sql"))];

fn migrations() -> Migrations<'static> {
    Migrations::new(SCHEMA.to_vec())
}

/// Opens the database file at `path`, creating and migrating it as needed.
pub fn open_database(path: &Path) -> Result<Connection, StorageError> {
    prepare(Connection::open(path)?)
}

/// Fresh in-memory database with the current schema.
pub fn open_in_memory() -> Result<Connection, StorageError> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(mut conn: Connection) -> Result<Connection, StorageError> {
    // The CLI may read while an install rewrites the tables.
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    migrations()
        .to_latest(&mut conn)
        .map_err(|e| StorageError::Migration(e.to_string()))?;
    Ok(conn)
}
