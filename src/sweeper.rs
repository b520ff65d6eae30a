//! Retention sweeper for the update root.
//!
//! After an install only the active bundle is worth keeping. Without an
//! installed manifest nothing in the root is reachable, so the whole root
//! goes.

use crate::manifest::read_installed_manifest;
use crate::utils::fs::remove_dir_all_if_exists;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Remove every bundle directory except the active one.
///
/// Plain files in the root (the manifest itself, stray downloads) are left
/// alone. Running it twice is the same as running it once.
pub async fn cleanup_old_render(update_root: &Path) -> Result<()> {
    let Some(manifest) = read_installed_manifest(update_root).await else {
        info!(root = %update_root.display(), "No installed manifest, removing update root");
        return remove_dir_all_if_exists(update_root).await;
    };

    let mut entries = match tokio::fs::read_dir(update_root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read update root: {}", update_root.display()));
        }
    };

    let mut removed = 0usize;
    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        if !file_type.is_dir() || entry.file_name() == manifest.version.as_str() {
            continue;
        }
        let path = entry.path();
        debug!(path = %path.display(), "Removing old render bundle");
        remove_dir_all_if_exists(&path).await?;
        removed += 1;
    }

    if removed > 0 {
        info!(removed, keep = %manifest.version, "Cleaned up old render bundles");
    }
    Ok(())
}
