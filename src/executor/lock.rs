//! Exclusive run lock on a distribution root.

use anyhow::{anyhow, Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

pub const LOCK_FILE_NAME: &str = ".dist-pruner.lock";

/// Held for the duration of a run; the lock file is removed on drop.
#[derive(Debug)]
pub struct RunLock {
    _file: File,
    path: PathBuf,
}

impl RunLock {
    /// Take the lock for `root`, failing fast when another run holds it.
    pub fn acquire(root: &Path) -> Result<Self> {
        let path = root.join(LOCK_FILE_NAME);

        // Never unlink a lock file we do not hold: a second process could then
        // create a fresh file at the same path and lock it too.
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to create lock file: {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            drop(file);
            return Err(anyhow!(
                "Distribution is locked by another run: {}",
                path.display()
            ));
        }

        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_lock_fails_fast() {
        let temp = TempDir::new().unwrap();
        let lock = RunLock::acquire(temp.path()).unwrap();
        assert!(lock.path().exists());

        let err = RunLock::acquire(temp.path()).unwrap_err();
        assert!(err.to_string().contains(LOCK_FILE_NAME));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let path = {
            let lock = RunLock::acquire(temp.path()).unwrap();
            lock.path().to_path_buf()
        };
        assert!(!path.exists());

        RunLock::acquire(temp.path()).unwrap();
    }
}
