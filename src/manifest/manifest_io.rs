//! Reading and writing manifests.

use super::ReleaseManifest;
use crate::constants::INSTALLED_MANIFEST_FILENAME;
use crate::core::UpdateError;
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Location of the installed manifest inside `update_root`.
#[must_use]
pub fn installed_manifest_path(update_root: &Path) -> PathBuf {
    update_root.join(INSTALLED_MANIFEST_FILENAME)
}

/// Parse a release manifest document and validate it.
pub fn parse_release_manifest(text: &str) -> Result<ReleaseManifest, UpdateError> {
    let manifest: ReleaseManifest =
        serde_yaml::from_str(text).map_err(|e| UpdateError::Parse {
            what: "release manifest".to_string(),
            reason: e.to_string(),
        })?;
    manifest.validate()?;
    Ok(manifest)
}

/// Load the installed manifest, if there is a usable one.
///
/// A missing file is the normal "nothing installed yet" state. A file that
/// cannot be read or parsed is logged and treated the same way, so the
/// updater falls back to the bundled renderer instead of failing.
pub async fn read_installed_manifest(update_root: &Path) -> Option<ReleaseManifest> {
    let path = installed_manifest_path(update_root);
    let content = match fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No installed manifest");
            return None;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read installed manifest");
            return None;
        }
    };

    match serde_yaml::from_str::<ReleaseManifest>(&content) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unparsable installed manifest");
            None
        }
    }
}

/// Persist `manifest` as the installed manifest, replacing any previous one.
pub async fn write_installed_manifest(update_root: &Path, manifest: &ReleaseManifest) -> Result<()> {
    let path = installed_manifest_path(update_root);
    let content = serde_json::to_vec(manifest).context("Failed to serialize manifest")?;
    atomic_write(&path, &content).await?;
    debug!(path = %path.display(), version = %manifest.version, "Installed manifest written");
    Ok(())
}
