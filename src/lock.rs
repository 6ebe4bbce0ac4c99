//! File-based locking for single-writer safety.
//!
//! Cross-platform (fs2) advisory exclusive lock on `<root>/LOCK`, released
//! on Drop. Concatenation is an offline, single-writer operation; holding
//! the lock on both roots keeps a second process (or a second handle in
//! this process) from appending mid-merge.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::consts::LOCK_FILE;

pub struct LockGuard {
    file: std::fs::File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}

fn open_lock_file(root: &Path) -> Result<(std::fs::File, PathBuf)> {
    let path = root.join(LOCK_FILE);
    let f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("open lock file {}", path.display()))?;
    Ok((f, path))
}

/// Try to take the exclusive lock; fails fast if another handle holds it.
pub fn try_acquire_exclusive_lock(root: &Path) -> Result<LockGuard> {
    let (file, path) = open_lock_file(root)?;
    file.try_lock_exclusive()
        .with_context(|| format!("try_lock_exclusive failed: {}", path.display()))?;
    Ok(LockGuard { file, path })
}
