//! Per-session memo of remote release lookups.

use crate::manifest::ReleaseManifest;
use tokio::sync::Mutex;

/// Single-slot cache for the resolved release tag and its manifest.
///
/// One cache lives inside each [`ReleaseClient`](super::ReleaseClient), so a
/// new client (new process or session) always starts empty. Only successful
/// lookups are stored; a failed fetch leaves the slot empty and the next
/// call goes back to the network.
///
/// Each slot is guarded by an async mutex that is held across the fetch, so
/// concurrent callers share one round trip instead of racing.
#[derive(Debug, Default)]
pub struct ReleaseCache {
    pub(super) tag: Mutex<Option<String>>,
    pub(super) manifest: Mutex<Option<ReleaseManifest>>,
}

impl ReleaseCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget both slots.
    pub async fn reset(&self) {
        *self.tag.lock().await = None;
        *self.manifest.lock().await = None;
    }

    /// Pre-seed the tag slot.
    pub async fn inject_tag(&self, tag: impl Into<String>) {
        *self.tag.lock().await = Some(tag.into());
    }

    /// Pre-seed the manifest slot.
    pub async fn inject_manifest(&self, manifest: ReleaseManifest) {
        *self.manifest.lock().await = Some(manifest);
    }

    /// Currently cached tag.
    pub async fn cached_tag(&self) -> Option<String> {
        self.tag.lock().await.clone()
    }

    /// Currently cached manifest.
    pub async fn cached_manifest(&self) -> Option<ReleaseManifest> {
        self.manifest.lock().await.clone()
    }
}
