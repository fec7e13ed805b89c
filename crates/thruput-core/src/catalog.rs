//! Component catalog: component name to throughput curve file.
//!
//! Built from component table rows. Names are lowercased once here so graph
//! data and component data may come from differently-cased inputs.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::edge::{ComponentRow, CLEAR};
use crate::error::CoreError;
use crate::graph::GraphTable;

/// File backing a resolved component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentFile {
    /// Pass-through element with a throughput of one and no file.
    Clear,
    /// Two-column throughput curve file.
    Curve(PathBuf),
}

impl ComponentFile {
    pub fn is_clear(&self) -> bool {
        matches!(self, ComponentFile::Clear)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ComponentFile::Clear => None,
            ComponentFile::Curve(path) => Some(path),
        }
    }
}

/// Read-only mapping from component name to curve file.
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    files: IndexMap<String, PathBuf>,
}

impl ComponentCatalog {
    /// Builds the catalog, resolving filenames against `data_dir`.
    ///
    /// When a name appears more than once only the first row is kept.
    pub fn from_rows<I>(rows: I, data_dir: &Path) -> Self
    where
        I: IntoIterator<Item = ComponentRow>,
    {
        let mut files = IndexMap::new();
        for row in rows {
            let name = row.compname.trim().to_lowercase();
            if files.contains_key(&name) {
                tracing::warn!(component = %name, "duplicate component table row ignored");
                continue;
            }
            files.insert(name, data_dir.join(row.filename.trim()));
        }
        ComponentCatalog { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns the file for a single component name.
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.files.get(name).map(PathBuf::as_path)
    }

    /// Maps component names to files, in order.
    ///
    /// `clear` and empty names become [`ComponentFile::Clear`]. The first
    /// name with no catalog entry fails the whole lookup.
    pub fn lookup<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ComponentFile>, CoreError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                if name.is_empty() || name == CLEAR {
                    return Ok(ComponentFile::Clear);
                }
                self.files
                    .get(name)
                    .map(|path| ComponentFile::Curve(path.clone()))
                    .ok_or_else(|| CoreError::UnknownComponent {
                        name: name.to_string(),
                    })
            })
            .collect()
    }

    /// Graph components with no catalog entry.
    pub fn missing(&self, graph: &GraphTable) -> Vec<String> {
        graph
            .components()
            .into_iter()
            .filter(|c| !self.files.contains_key(c))
            .collect()
    }
}
