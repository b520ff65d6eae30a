//! Version gate: decides whether a renderer hot update should run.
//!
//! The checks run in a fixed order and stop at the first one that says no:
//!
//! ```text
//! 1. feature flag enabled?                  -> Disabled
//! 2. remote manifest fetchable?             -> ManifestUnavailable
//! 3. policy: remote newer than app?         -> NotNewer
//! 4. app >= manifest.minimum?               -> HostUnsupported (+ shell update)
//! 5. app version == manifest version?       -> VersionEqual
//! 6. app commit == manifest commit?         -> CommitEqual
//! 7. installed version == manifest version? -> AlreadyInstalledVersion
//! 8. installed commit == manifest commit?   -> AlreadyInstalledCommit
//! 9. proceed
//! ```
//!
//! The host compatibility check sits before the equality shortcuts: a shell
//! that is too old must always be pointed at the platform updater, whatever
//! the version strings look like.

mod policy;

pub use policy::{SemverPolicy, UpdatePolicy, parse_version};

use crate::host::{EventSink, HostUpdater, UpdateEvent};
use crate::manifest::{ReleaseManifest, read_installed_manifest};
use crate::release::ReleaseClient;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Identity of the running application build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    /// Shell/app version (e.g. `"0.3.0"` or `"0.3.1-nightly.20240101"`).
    pub version: String,
    /// Commit the running renderer was built from; empty when unknown.
    pub commit: String,
}

impl AppInfo {
    /// Build info from explicit values.
    pub fn new(version: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            commit: commit.into(),
        }
    }

    /// Info embedded at compile time (`GIT_COMMIT_HASH` env var for the commit).
    #[must_use]
    pub fn current() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"), option_env!("GIT_COMMIT_HASH").unwrap_or_default())
    }
}

/// Why the gate declined an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The hot-update feature flag is off.
    Disabled,
    /// The release manifest could not be fetched or parsed.
    ManifestUnavailable,
    /// The update policy does not consider the release newer.
    NotNewer {
        /// Running version
        current: String,
        /// Release version
        remote: String,
    },
    /// The running shell is older than the release's minimum.
    HostUnsupported {
        /// Running version
        current: String,
        /// Minimum version required by the release
        minimum: String,
    },
    /// The running app already is the release version.
    VersionEqual,
    /// The running app was built from the release commit.
    CommitEqual,
    /// The release version is already installed.
    AlreadyInstalledVersion,
    /// A bundle from the release commit is already installed.
    AlreadyInstalledCommit,
    /// Another install-and-sweep cycle holds the update lock.
    InProgress,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "render hot update is disabled"),
            Self::ManifestUnavailable => write!(f, "release manifest unavailable"),
            Self::NotNewer { current, remote } => {
                write!(f, "release {remote} is not newer than {current}")
            }
            Self::HostUnsupported { current, minimum } => {
                write!(f, "app {current} is below the minimum {minimum}; shell update requested")
            }
            Self::VersionEqual => write!(f, "version is equal"),
            Self::CommitEqual => write!(f, "commit is equal"),
            Self::AlreadyInstalledVersion => write!(f, "installed manifest version is equal"),
            Self::AlreadyInstalledCommit => write!(f, "installed manifest commit is equal"),
            Self::InProgress => write!(f, "another update is in progress"),
        }
    }
}

/// Result of evaluating the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Update to this release.
    Proceed(ReleaseManifest),
    /// Do nothing.
    Skip(SkipReason),
}

impl GateDecision {
    /// Whether an update should run.
    #[must_use]
    pub const fn should_update(&self) -> bool {
        matches!(self, Self::Proceed(_))
    }
}

/// Shell update handed off to the platform updater.
///
/// Holds the handle of the last spawned check-then-download task.
#[derive(Debug, Default)]
pub struct ShellUpdateTask {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ShellUpdateTask {
    fn replace(&self, handle: JoinHandle<()>) {
        if let Ok(mut slot) = self.handle.lock() {
            *slot = Some(handle);
        }
    }

    /// Whether a handed-off shell update is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }

    /// Wait for the last handed-off shell update, if any.
    pub async fn join(&self) {
        let handle = self.handle.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            error!(error = ?e, "Shell update task failed");
        }
    }
}

/// Everything the gate reads, borrowed from the owning updater.
pub struct VersionGate<'a> {
    /// Feature flag.
    pub enabled: bool,
    /// Running build.
    pub app: &'a AppInfo,
    /// Release metadata source.
    pub client: &'a ReleaseClient,
    /// Update root holding the installed manifest.
    pub update_root: &'a Path,
    /// Platform updater for the shell.
    pub host: Arc<dyn HostUpdater>,
    /// Slot for the handed-off shell update.
    pub shell_update: &'a ShellUpdateTask,
    /// Telemetry.
    pub events: &'a dyn EventSink,
    /// Version comparison.
    pub policy: &'a dyn UpdatePolicy,
}

impl VersionGate<'_> {
    /// Run the checks in order.
    pub async fn evaluate(&self) -> GateDecision {
        if !self.enabled {
            return GateDecision::Skip(SkipReason::Disabled);
        }

        let Some(manifest) = self.client.latest_release_manifest().await else {
            return GateDecision::Skip(SkipReason::ManifestUnavailable);
        };

        let current = &self.app.version;
        if !self.policy.should_update(current, &manifest.version) {
            info!(current = %current, remote = %manifest.version, "Release is not newer, skip update");
            return GateDecision::Skip(SkipReason::NotNewer {
                current: current.clone(),
                remote: manifest.version.clone(),
            });
        }

        if !self.policy.host_supports(current, &manifest.minimum) {
            self.events.emit(UpdateEvent::HostNotSupported {
                app_version: current.clone(),
                manifest_version: manifest.version.clone(),
            });
            self.request_shell_update();
            return GateDecision::Skip(SkipReason::HostUnsupported {
                current: current.clone(),
                minimum: manifest.minimum.clone(),
            });
        }

        if *current == manifest.version {
            info!("version is equal, skip update");
            return GateDecision::Skip(SkipReason::VersionEqual);
        }

        if !self.app.commit.is_empty() && self.app.commit == manifest.commit {
            info!("commit is equal, skip update");
            return GateDecision::Skip(SkipReason::CommitEqual);
        }

        if let Some(installed) = read_installed_manifest(self.update_root).await {
            if installed.version == manifest.version {
                info!("manifest version is equal, skip update");
                return GateDecision::Skip(SkipReason::AlreadyInstalledVersion);
            }
            if installed.commit == manifest.commit {
                info!("manifest commit is equal, skip update");
                return GateDecision::Skip(SkipReason::AlreadyInstalledCommit);
            }
        }

        GateDecision::Proceed(manifest)
    }

    /// Spawn check-then-download of a shell update. Failures are logged only.
    fn request_shell_update(&self) {
        info!("Shell too old for the latest renderer, requesting shell update");
        let host = Arc::clone(&self.host);
        let handle = tokio::spawn(async move {
            if let Err(e) = host.check_for_updates().await {
                error!(error = ?e, "Failed to check for updates");
                return;
            }
            if let Err(e) = host.download_update().await {
                error!(error = ?e, "Failed to download update");
            }
        });
        self.shell_update.replace(handle);
    }
}
