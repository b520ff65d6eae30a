//! Cross-process update lock.
//!
//! Only one install-and-sweep cycle may touch an update root at a time. The
//! lock is an OS advisory lock (via `fs4`) on a file next to the update root:
//!
//! ```text
//! <data-dir>/
//!   .render.lock   <- locked while a cycle runs
//!   render/        <- update root
//! ```
//!
//! The lock file lives outside the root so the sweeper's "delete the whole
//! root" path never races with it. Acquisition never waits: a held lock means
//! another cycle is already doing the work.

use crate::core::UpdateError;
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive hold on an update root. Released on drop.
#[derive(Debug)]
pub struct UpdateLock {
    _file: File,
    lock_path: PathBuf,
}

impl UpdateLock {
    /// Lock file guarding `update_root`.
    #[must_use]
    pub fn lock_path(update_root: &Path) -> PathBuf {
        let name = update_root
            .file_name()
            .map_or_else(|| "render".to_string(), |n| n.to_string_lossy().into_owned());
        let lock_name = format!(".{name}.lock");
        match update_root.parent() {
            Some(parent) => parent.join(lock_name),
            None => update_root.join(lock_name),
        }
    }

    /// Try to take the lock without waiting.
    ///
    /// Returns `Ok(None)` when another holder has it.
    pub async fn try_acquire(update_root: &Path) -> Result<Option<Self>, UpdateError> {
        let lock_path = Self::lock_path(update_root);
        let path = lock_path.clone();

        let result = tokio::task::spawn_blocking(move || -> std::io::Result<Option<File>> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).write(true).truncate(false).open(&path)?;
            if file.try_lock_exclusive()? { Ok(Some(file)) } else { Ok(None) }
        })
        .await
        .map_err(|e| UpdateError::Lock {
            path: lock_path.display().to_string(),
            reason: format!("lock task failed: {e}"),
        })?;

        match result {
            Ok(Some(file)) => {
                debug!(path = %lock_path.display(), "Update lock acquired");
                Ok(Some(Self {
                    _file: file,
                    lock_path,
                }))
            }
            Ok(None) => {
                debug!(path = %lock_path.display(), "Update lock is held elsewhere");
                Ok(None)
            }
            Err(e) => Err(UpdateError::Lock {
                path: lock_path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

impl Drop for UpdateLock {
    fn drop(&mut self) {
        // Closing the handle releases the lock; the file itself stays so every
        // contender keeps locking the same inode.
        debug!(path = %self.lock_path.display(), "Update lock released");
    }
}
