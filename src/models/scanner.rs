//! Enumerates candidate model directories under the registry root.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::RegistryError;

/// A model directory found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDir {
    pub name: String,
    pub path: PathBuf,
}

/// Lists the immediate subdirectories of a registry root.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    root: PathBuf,
}

impl DirectoryScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root if needed, then return its subdirectories sorted by name.
    ///
    /// Hidden entries (leading `.`) are registry bookkeeping, not models.
    /// A failure to create or read the root fails the whole scan.
    pub fn scan(&self) -> Result<Vec<ModelDir>, RegistryError> {
        let scan_err = |source| RegistryError::Scan { path: self.root.clone(), source };

        fs::create_dir_all(&self.root).map_err(scan_err)?;

        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(scan_err)? {
            let entry = entry.map_err(scan_err)?;
            let path = entry.path();

            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(path = %path.display(), "Skipping directory with non-UTF-8 name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            // Follows symlinks; a link to a model directory is a model.
            if !path.is_dir() {
                continue;
            }
            dirs.push(ModelDir { name, path });
        }

        dirs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(dirs)
    }
}
