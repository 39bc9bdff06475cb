//! Advisory lock guarding the store against concurrent runs.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use jobsync_core::Result;
use jobsync_core::error::StoreError;

/// Exclusive lock on `<store>.lock`, released on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Try to take the lock for the store at `store_path` without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] if another run holds the lock.
    pub fn acquire(store_path: &Path) -> Result<Self> {
        let path = lock_path(store_path);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::Io {
                path: path.clone(),
                message: e.to_string(),
            })?;

        if file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked {
                path: store_path.to_path_buf(),
            }
            .into());
        }

        debug!(path = %path.display(), "store lock acquired");
        Ok(Self { file, path })
    }

    /// Returns the lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn lock_path(store_path: &Path) -> PathBuf {
    let mut name = OsString::from(store_path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}
