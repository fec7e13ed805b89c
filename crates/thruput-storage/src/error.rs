//! Storage error types for thruput-storage.
//!
//! [`StorageError`] covers database access, migrations, curve library
//! installation and configuration. Resolution failures from the core crate
//! pass through unchanged as [`StorageError::Core`].

use std::path::PathBuf;

use thiserror::Error;

use thruput_core::CoreError;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// JSON serialization failed while fingerprinting rows.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A file or directory operation failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spectral library directory is unset or does not exist.
    #[error("spectral library directory {path} does not exist")]
    LibraryDir { path: PathBuf },

    /// Stored tables are missing or inconsistent.
    #[error("integrity error: {reason}")]
    IntegrityError { reason: String },

    /// Configuration could not be determined from the environment.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
