//! Atomic JSON writes.
//!
//! The new content goes to a temporary file in the destination directory,
//! is flushed to disk, then renamed over the target. Readers see either the
//! old file or the new one, never a partial write.
//!
//! A replaced file keeps its permissions. A new file gets `0666` less the
//! process umask, as `fs::write` would give it.

use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::Builder;

use super::error::RegistryError;

fn persist_error(path: &Path, source: io::Error) -> RegistryError {
    RegistryError::Persist { path: path.to_path_buf(), source }
}

/// Serialize `value` as pretty JSON and atomically replace `path`.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RegistryError> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| persist_error(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;
    atomic_write(path, &json)
}

/// Atomically replace `path` with `bytes`.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), RegistryError> {
    let dir = path.parent().ok_or_else(|| {
        persist_error(path, io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))
    })?;

    let existing = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(persist_error(path, e)),
    };

    let mut builder = Builder::new();
    if existing.is_none() {
        if let Some(perms) = new_file_permissions() {
            builder.permissions(perms);
        }
    }

    let mut tmp = builder.tempfile_in(dir).map_err(|e| persist_error(path, e))?;
    if let Some(perms) = existing {
        tmp.as_file().set_permissions(perms).map_err(|e| persist_error(path, e))?;
    }
    tmp.write_all(bytes).map_err(|e| persist_error(path, e))?;
    tmp.as_file().sync_all().map_err(|e| persist_error(path, e))?;
    tmp.persist(path).map_err(|e| persist_error(path, e.error))?;
    Ok(())
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    // Passed to open(2), so the umask still applies.
    Some(Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}
