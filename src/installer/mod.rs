//! Archive installer.
//!
//! Turns a verified `.tar.gz` renderer archive into an active version
//! directory under the update root:
//!
//! ```text
//! <update-root>/
//!   .staging-<uuid>/renderer/...   <- stage_archive(): unpack here
//!   <version>/...                  <- StagedBundle::promote(): rename here
//!   manifest.yml                   <- then record <version> as active
//! ```
//!
//! The rename is the commit point. Until it happens no directory carries the
//! final version name, so a reader sees either the previous installation or
//! nothing of the new one, never a half-unpacked bundle under its real name.
//! Staging lives inside the update root so the rename stays on one file
//! system.
//!
//! If recording the manifest fails after the rename, the new version directory
//! is removed again; otherwise the next sweep would find an unreferenced
//! directory and the root would briefly hold two candidate bundles.

use crate::constants::{ARCHIVE_ROOT_DIR, STAGING_DIR_PREFIX};
use crate::core::UpdateError;
use crate::manifest::{ReleaseManifest, write_installed_manifest};
use crate::utils::fs::{ensure_dir, remove_dir_all_if_exists};
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// An archive unpacked into a staging directory, not yet active.
///
/// Dropping it without calling [`promote`](Self::promote) removes the
/// staging directory.
#[derive(Debug)]
pub struct StagedBundle {
    update_root: PathBuf,
    staging_dir: PathBuf,
}

/// Unpack `archive` into a fresh staging directory under `update_root`.
///
/// Creates the update root if needed.
pub async fn stage_archive(update_root: &Path, archive: &Path) -> Result<StagedBundle, UpdateError> {
    ensure_dir(update_root)
        .await
        .map_err(|e| UpdateError::file_system("create update root", &e))?;

    let staging_dir = update_root.join(format!("{STAGING_DIR_PREFIX}{}", uuid::Uuid::new_v4()));
    let staged = StagedBundle {
        update_root: update_root.to_path_buf(),
        staging_dir: staging_dir.clone(),
    };

    let archive_path = archive.to_path_buf();
    tokio::task::spawn_blocking(move || extract_tar_gz(&archive_path, &staging_dir))
        .await
        .map_err(|e| UpdateError::Extraction {
            archive: archive.display().to_string(),
            reason: format!("extraction task failed: {e}"),
        })??;

    debug!(staging = %staged.staging_dir.display(), "Archive staged");
    Ok(staged)
}

/// Unpack a gzip-compressed tar archive into `dest`.
///
/// `tar` refuses entries that would escape `dest` (`..` components and
/// absolute paths).
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<(), UpdateError> {
    let extraction_error = |reason: String| UpdateError::Extraction {
        archive: archive.display().to_string(),
        reason,
    };

    let file = File::open(archive).map_err(|e| extraction_error(e.to_string()))?;
    std::fs::create_dir_all(dest).map_err(|e| extraction_error(e.to_string()))?;

    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);
    tar.unpack(dest).map_err(|e| extraction_error(e.to_string()))
}

impl StagedBundle {
    /// Staging directory holding the unpacked archive.
    #[must_use]
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Move the staged bundle into place as `manifest.version` and record
    /// `manifest` as the installed manifest.
    ///
    /// Returns the version directory.
    pub async fn promote(self, manifest: &ReleaseManifest) -> Result<PathBuf, UpdateError> {
        manifest.validate()?;

        let source = self.staging_dir.join(ARCHIVE_ROOT_DIR);
        let is_dir = tokio::fs::metadata(&source).await.map(|m| m.is_dir()).unwrap_or(false);
        if !is_dir {
            return Err(UpdateError::ArchiveLayout {
                expected: ARCHIVE_ROOT_DIR.to_string(),
            });
        }

        let target = self.update_root.join(&manifest.version);
        if tokio::fs::metadata(&target).await.is_ok() {
            warn!(path = %target.display(), "Replacing leftover version directory");
            remove_dir_all_if_exists(&target)
                .await
                .map_err(|e| UpdateError::file_system("remove leftover version directory", &e))?;
        }

        tokio::fs::rename(&source, &target).await.map_err(|e| UpdateError::FileSystem {
            operation: "rename staged bundle".to_string(),
            reason: format!("{} -> {}: {e}", source.display(), target.display()),
        })?;

        if let Err(e) = write_installed_manifest(&self.update_root, manifest).await {
            if let Err(cleanup) = remove_dir_all_if_exists(&target).await {
                warn!(error = %cleanup, "Failed to roll back version directory");
            }
            return Err(UpdateError::file_system("persist installed manifest", &e));
        }

        info!(version = %manifest.version, path = %target.display(), "Render bundle installed");
        Ok(target)
    }
}

impl Drop for StagedBundle {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.staging_dir)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            debug!(path = %self.staging_dir.display(), error = %e, "Failed to remove staging directory");
        }
    }
}
