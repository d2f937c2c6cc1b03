//! Advisory lock guarding the checkpoint files.
//!
//! Two runs against the same `{TARGET_DIR}/{EXPORT_DIR}` would otherwise race
//! on the export and report caches. The lock is held for the life of the
//! returned guard.
use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions, TryLockError};
use std::path::Path;

/// Exclusive lock on the checkpoint directory.
#[derive(Debug)]
pub struct StateLock {
    _file: File,
}

impl StateLock {
    /// Take the lock without blocking; fails if another run holds it.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .with_context(|| format!("open lock {}", path.display()))?;
        try_lock_exclusive(&file).with_context(|| format!("lock {}", path.display()))?;
        tracing::debug!(path = %path.display(), "state lock acquired");
        Ok(Self { _file: file })
    }
}

fn try_lock_exclusive(file: &File) -> Result<()> {
    match file.try_lock() {
        Ok(()) => Ok(()),
        Err(TryLockError::WouldBlock) => Err(anyhow!(
            "another assessment run holds the lock; wait for it to finish"
        )),
        Err(TryLockError::Error(err)) => Err(err.into()),
    }
}
