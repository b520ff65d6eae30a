//! Entry resolver: where the shell should load the renderer from.

use crate::constants::ENTRY_FILENAME;
use crate::manifest::read_installed_manifest;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Entry document of the installed bundle, if there is one.
///
/// `None` means the shell should fall back to its built-in renderer.
pub async fn load_dynamic_render_entry(update_root: &Path) -> Option<PathBuf> {
    let manifest = read_installed_manifest(update_root).await?;
    let entry = update_root.join(&manifest.version).join(ENTRY_FILENAME);

    match tokio::fs::metadata(&entry).await {
        Ok(meta) if meta.is_file() => Some(entry),
        _ => {
            debug!(path = %entry.display(), "Installed manifest points at a missing entry");
            None
        }
    }
}
