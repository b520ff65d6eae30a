//! Asset fetcher and verifier.
//!
//! Downloads the archive named by a release manifest, keeps a copy in the
//! download directory and accepts it only if its SHA-256 matches the
//! manifest's `hash`. A rejected archive is left on disk but never unpacked.

mod verification;

pub use verification::ChecksumVerifier;

use crate::core::UpdateError;
use crate::host::{EventSink, UpdateEvent};
use crate::manifest::ReleaseManifest;
use crate::release::ReleaseClient;
use crate::utils::fs::ensure_dir;
use std::path::{Path, PathBuf};
use tracing::info;

/// Download and verify the archive for `manifest`.
///
/// `DownloadStarted` is emitted before the request, so attempts that fail are
/// counted too. Returns the path of the verified archive.
pub async fn download_render_asset(
    client: &ReleaseClient,
    events: &dyn EventSink,
    download_dir: &Path,
    manifest: &ReleaseManifest,
) -> Result<PathBuf, UpdateError> {
    manifest.validate()?;
    events.emit(UpdateEvent::DownloadStarted {
        version: manifest.version.clone(),
    });

    let url = client.file_download_url(&manifest.filename).await?;
    info!(url = %url, "Downloading render asset");
    let bytes = client.download_file(&url).await?;

    ensure_dir(download_dir)
        .await
        .map_err(|e| UpdateError::file_system("create download directory", &e))?;
    let file_path = download_dir.join(&manifest.filename);
    tokio::fs::write(&file_path, &bytes).await.map_err(|e| UpdateError::FileSystem {
        operation: "write downloaded archive".to_string(),
        reason: format!("{}: {e}", file_path.display()),
    })?;

    ChecksumVerifier::verify_bytes(&bytes, &manifest.hash)?;
    Ok(file_path)
}
