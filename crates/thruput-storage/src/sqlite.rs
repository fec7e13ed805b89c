//! SQLite implementation of [`TableStore`].
//!
//! [`SqliteStore`] keeps the graph and component tables in a SQLite database
//! with WAL mode and automatic schema migrations. Both tables and the
//! fingerprint are rewritten inside a single transaction.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use thruput_core::{ComponentRow, GraphRow, NodeId};

use crate::error::StorageError;
use crate::schema::FINGERPRINT_KEY;
use crate::traits::TableStore;

/// SQLite-backed implementation of [`TableStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn })
    }
}

/// Node columns are plain INTEGERs; anything outside `u32` was not written
/// by this store.
fn node_id(value: i64) -> Result<NodeId, StorageError> {
    u32::try_from(value)
        .map(NodeId)
        .map_err(|_| StorageError::IntegrityError {
            reason: format!("graph node {value} is out of range"),
        })
}

impl TableStore for SqliteStore {
    fn save_tables(
        &mut self,
        graph_rows: &[GraphRow],
        component_rows: &[ComponentRow],
        fingerprint: &str,
    ) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM graph_rows", [])?;
        tx.execute("DELETE FROM component_rows", [])?;

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO graph_rows (compname, keyword, innode, outnode, thcompname, comment)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in graph_rows {
                stmt.execute(params![
                    row.compname,
                    row.keyword,
                    row.innode.0,
                    row.outnode.0,
                    row.thcompname,
                    row.comment,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO component_rows (time, compname, filename, comment)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in component_rows {
                stmt.execute(params![row.time, row.compname, row.filename, row.comment])?;
            }
        }

        tx.execute(
            "INSERT OR REPLACE INTO table_meta (key, value) VALUES (?1, ?2)",
            params![FINGERPRINT_KEY, fingerprint],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn load_graph_rows(&self) -> Result<Vec<GraphRow>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT compname, keyword, innode, outnode, thcompname, comment
             FROM graph_rows ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut graph_rows = Vec::new();
        for row in rows {
            let (compname, keyword, innode, outnode, thcompname, comment) = row?;
            graph_rows.push(GraphRow {
                compname,
                keyword,
                innode: node_id(innode)?,
                outnode: node_id(outnode)?,
                thcompname,
                comment,
            });
        }
        Ok(graph_rows)
    }

    fn load_component_rows(&self) -> Result<Vec<ComponentRow>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT time, compname, filename, comment FROM component_rows ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ComponentRow {
                time: row.get(0)?,
                compname: row.get(1)?,
                filename: row.get(2)?,
                comment: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn fingerprint(&self) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM table_meta WHERE key = ?1",
                params![FINGERPRINT_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}
