//! File system helpers for the update root.
//!
//! Everything here is async (tokio) and returns `anyhow::Result` with the
//! path in the context, the way the rest of the crate's I/O reports errors.

use anyhow::{Context, Result};
use std::path::{Component, Path};
use tokio::fs;

/// Create `path` and all parents, failing if it exists as a non-directory.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display())),
        Err(_) => fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory: {}", path.display())),
    }
}

/// Atomically replace `path` with `content`.
///
/// Writes a sibling `.tmp` file, syncs it, then renames it over the target,
/// so readers see either the old content or the new content.
pub async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path)
            .await
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(content)
            .await
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;
        file.sync_all().await.context("Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))
}

/// Recursively remove a directory; a missing directory is not an error.
pub async fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove directory: {}", path.display())),
    }
}

/// True when `name` is a single normal path component.
///
/// Used for names that come from the remote manifest (archive filename,
/// version) before they are joined onto local directories.
#[must_use]
pub fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}
