//! Deterministic fingerprint of the graph table using blake3.
//!
//! Rows are serialized with `serde_json` in table order, so reordering rows
//! changes the fingerprint just as it changes which default edge wins.

use thruput_core::GraphRow;

use crate::error::StorageError;

/// Hex-encoded blake3 hash of `rows`.
pub fn fingerprint(rows: &[GraphRow]) -> Result<String, StorageError> {
    let mut hasher = blake3::Hasher::new();
    for row in rows {
        hasher.update(&serde_json::to_vec(row)?);
        hasher.update(b"\n");
    }
    Ok(hasher.finalize().to_hex().to_string())
}
