//! Advisory file locks serializing registry mutations.
//!
//! Locks are OS-level (`flock` / `LockFileEx`) so they hold across processes
//! sharing one registry root, not only across threads of this one. Each lock
//! is a file under `<root>/.locks/`; the guard releases it on drop.
//!
//! Ordering: the pointer lock is always taken before any model lock.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use super::error::RegistryError;

/// Directory under the registry root holding lock files.
pub const LOCK_DIR: &str = ".locks";

const POINTER_LOCK: &str = "active.lock";

/// Hands out scoped locks for one registry root.
#[derive(Debug, Clone)]
pub struct LockTable {
    dir: PathBuf,
}

impl LockTable {
    pub fn new(root: &Path) -> Self {
        Self { dir: root.join(LOCK_DIR) }
    }

    /// Root-scoped lock guarding the active pointer.
    pub fn pointer(&self) -> Result<LockGuard, RegistryError> {
        self.acquire(self.dir.join(POINTER_LOCK))
    }

    /// Lock guarding one model's metadata file and directory.
    pub fn model(&self, name: &str) -> Result<LockGuard, RegistryError> {
        self.acquire(self.model_path(name))
    }

    /// Lock file for `name`. Named by digest so any legal directory name
    /// maps to a short, fixed-length filename.
    pub fn model_path(&self, name: &str) -> PathBuf {
        let digest = Sha256::digest(name.as_bytes());
        self.dir.join(format!("model-{}.lock", hex::encode(digest)))
    }

    fn acquire(&self, path: PathBuf) -> Result<LockGuard, RegistryError> {
        let lock_err = |source| RegistryError::Lock { path: path.clone(), source };

        fs::create_dir_all(&self.dir).map_err(lock_err)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(lock_err)?;
        file.lock_exclusive().map_err(lock_err)?;

        trace!(lock = %path.display(), "lock acquired");
        Ok(LockGuard { file, path })
    }
}

/// Held lock; released when dropped, on every exit path.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Closing the descriptor releases the lock even if unlock fails.
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!(lock = %self.path.display(), error = %e, "explicit unlock failed");
        }
        trace!(lock = %self.path.display(), "lock released");
    }
}
