//! Installation directories.
//!
//! Everything lives under a home directory (`~/.ucam_thruput` by default):
//! the table database and, unless overridden, the `data/` directory of
//! curve files. The spectral library only matters to
//! [`install_curves`](crate::install::install_curves) and has no default.

use std::path::{Path, PathBuf};

use crate::error::StorageError;

pub const HOME_VAR: &str = "THRUPUT_HOME";
pub const DATA_VAR: &str = "THRUPUT_DATA";
pub const LIBRARY_VAR: &str = "THRUPUT_CDBS";

/// Name of the table database inside the home directory.
pub const DATABASE_FILE: &str = "ucam_thruput.db";

/// Resolved installation directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThruputConfig {
    home: PathBuf,
    data_dir: PathBuf,
    library_dir: Option<PathBuf>,
}

impl ThruputConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Reads the configuration from the process environment, with `home`
    /// (when given) replacing only the home directory. Data and library
    /// directories still come from their variables.
    pub fn from_env_with_home(home: Option<PathBuf>) -> Result<Self, StorageError> {
        Self::resolve(|name| std::env::var(name).ok(), home)
    }

    /// Builds the configuration from a variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, StorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(lookup, None)
    }

    fn resolve<F>(lookup: F, home_override: Option<PathBuf>) -> Result<Self, StorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty()).map(PathBuf::from);

        let home = match home_override.or_else(|| var(HOME_VAR)) {
            Some(home) => home,
            None => var("HOME")
                .map(|home| home.join(".ucam_thruput"))
                .ok_or_else(|| StorageError::Config {
                    reason: format!("neither {HOME_VAR} nor HOME is set"),
                })?,
        };
        let data_dir = var(DATA_VAR).unwrap_or_else(|| home.join("data"));

        Ok(ThruputConfig {
            home,
            data_dir,
            library_dir: var(LIBRARY_VAR),
        })
    }

    /// Configuration rooted at `home` with default subdirectories.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        ThruputConfig {
            data_dir: home.join("data"),
            home,
            library_dir: None,
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_library_dir(mut self, library_dir: impl Into<PathBuf>) -> Self {
        self.library_dir = Some(library_dir.into());
        self
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Directory holding the curve files named in the component table.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn library_dir(&self) -> Option<&Path> {
        self.library_dir.as_deref()
    }

    pub fn database_path(&self) -> PathBuf {
        self.home.join(DATABASE_FILE)
    }
}
