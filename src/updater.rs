//! Hot-update pipeline.
//!
//! [`HotUpdater`] wires the release client, version gate, asset fetcher,
//! installer and sweeper together around one update root:
//!
//! ```text
//! gate ──skip──────────────────────────────────────────────> Skipped(reason)
//!   │ proceed
//!   ▼
//! download + verify ──error──────────────────────────────> Failed(error)
//!   ▼
//! stage archive ─> re-read manifest ─> promote ──error───> Failed(error)
//!   ▼
//! RenderUpdated event ─> notify window ──no window───────> Failed(NoWindow)
//!   ▼
//! Applied { version }
//! ```
//!
//! Install and sweep runs are single-flight: an in-process mutex guards
//! against concurrent callers sharing one updater, and an advisory file lock
//! ([`UpdateLock`]) against other processes. Neither waits; a busy updater
//! reports [`SkipReason::InProgress`].
//!
//! # Example
//!
//! ```rust,no_run
//! use render_updater::config::UpdaterConfig;
//! use render_updater::gate::AppInfo;
//! use render_updater::updater::{HotUpdater, UpdateOutcome};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = UpdaterConfig::load().await?;
//! let updater = HotUpdater::new(config, AppInfo::new("0.3.0", "abc123"))?;
//!
//! match updater.run().await {
//!     UpdateOutcome::Applied { version } => println!("renderer {version} installed"),
//!     UpdateOutcome::Skipped(reason) => println!("no update: {reason}"),
//!     UpdateOutcome::Failed(error) => eprintln!("update failed: {error}"),
//! }
//! # Ok(())
//! # }
//! ```

use crate::asset;
use crate::config::UpdaterConfig;
use crate::core::UpdateError;
use crate::entry;
use crate::gate::{
    AppInfo, GateDecision, SemverPolicy, ShellUpdateTask, SkipReason, UpdatePolicy, VersionGate,
};
use crate::host::{
    EventSink, HeadlessWindow, HostUpdater, NoopHostUpdater, TracingSink, UpdateEvent, WindowBridge,
};
use crate::installer;
use crate::lock::UpdateLock;
use crate::manifest::ReleaseManifest;
use crate::release::{ReleaseChannel, ReleaseClient};
use crate::sweeper;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// How a hot-update attempt ended.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// A new bundle is installed and active.
    Applied {
        /// Installed version
        version: String,
    },
    /// Nothing was done.
    Skipped(SkipReason),
    /// The attempt failed. The previous installation is still active unless
    /// the error is [`UpdateError::NoWindow`].
    Failed(UpdateError),
}

impl UpdateOutcome {
    /// Whether a bundle was installed.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Whether the attempt was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Whether the attempt failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Skip reason, if skipped.
    #[must_use]
    pub const fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Self::Skipped(reason) => Some(reason),
            _ => None,
        }
    }

    /// Error, if failed.
    #[must_use]
    pub const fn error(&self) -> Option<&UpdateError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Renderer hot updater for one update root.
pub struct HotUpdater {
    config: UpdaterConfig,
    app: AppInfo,
    client: ReleaseClient,
    host: Arc<dyn HostUpdater>,
    window: Arc<dyn WindowBridge>,
    events: Arc<dyn EventSink>,
    policy: Box<dyn UpdatePolicy>,
    update_root: PathBuf,
    download_dir: PathBuf,
    shell_update: ShellUpdateTask,
    in_flight: Mutex<()>,
}

/// Both halves of the single-flight guard.
struct FlightGuard<'a> {
    _local: MutexGuard<'a, ()>,
    _file: UpdateLock,
}

impl HotUpdater {
    /// Build an updater with headless collaborators.
    ///
    /// The release channel follows the app version. Replace the collaborators
    /// with the `with_*` methods.
    pub fn new(config: UpdaterConfig, app: AppInfo) -> Result<Self, UpdateError> {
        let update_root = config.update_root().map_err(|e| UpdateError::Config {
            message: format!("{e:#}"),
        })?;
        let download_dir = config.download_dir();
        let client = ReleaseClient::new(&config, ReleaseChannel::for_version(&app.version))?;

        debug!(
            root = %update_root.display(),
            channel = ?client.channel(),
            app_version = %app.version,
            "Hot updater ready"
        );

        Ok(Self {
            config,
            app,
            client,
            host: Arc::new(NoopHostUpdater),
            window: Arc::new(HeadlessWindow),
            events: Arc::new(TracingSink),
            policy: Box::new(SemverPolicy),
            update_root,
            download_dir,
            shell_update: ShellUpdateTask::default(),
            in_flight: Mutex::new(()),
        })
    }

    /// Use `host` for shell updates.
    #[must_use]
    pub fn with_host_updater(mut self, host: Arc<dyn HostUpdater>) -> Self {
        self.host = host;
        self
    }

    /// Use `window` to announce installed bundles.
    #[must_use]
    pub fn with_window(mut self, window: Arc<dyn WindowBridge>) -> Self {
        self.window = window;
        self
    }

    /// Send telemetry to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Compare versions with `policy`.
    #[must_use]
    pub fn with_policy(mut self, policy: impl UpdatePolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Running build.
    #[must_use]
    pub const fn app(&self) -> &AppInfo {
        &self.app
    }

    /// Release metadata client.
    #[must_use]
    pub const fn client(&self) -> &ReleaseClient {
        &self.client
    }

    /// Directory holding installed bundles.
    #[must_use]
    pub fn update_root(&self) -> &Path {
        &self.update_root
    }

    /// Directory downloaded archives are written to.
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Version gate over this updater's state.
    #[must_use]
    pub fn gate(&self) -> VersionGate<'_> {
        VersionGate {
            enabled: self.config.enable_render_hot_update,
            app: &self.app,
            client: &self.client,
            update_root: &self.update_root,
            host: Arc::clone(&self.host),
            shell_update: &self.shell_update,
            events: self.events.as_ref(),
            policy: self.policy.as_ref(),
        }
    }

    /// Run the gate.
    pub async fn evaluate(&self) -> GateDecision {
        self.gate().evaluate().await
    }

    /// Whether the gate currently allows an update.
    pub async fn can_update_render(&self) -> bool {
        self.evaluate().await.should_update()
    }

    /// Shell update last handed to the platform updater by the gate.
    #[must_use]
    pub const fn shell_update(&self) -> &ShellUpdateTask {
        &self.shell_update
    }

    /// Download and verify the archive for `manifest`.
    pub async fn download_render_asset(&self, manifest: &ReleaseManifest) -> Result<PathBuf, UpdateError> {
        asset::download_render_asset(&self.client, self.events.as_ref(), &self.download_dir, manifest).await
    }

    /// Install the latest bundle if the gate allows it.
    pub async fn hot_update_render(&self) -> UpdateOutcome {
        if !self.config.enable_render_hot_update {
            return UpdateOutcome::Skipped(SkipReason::Disabled);
        }
        let _guard = match self.try_enter().await {
            Ok(Some(guard)) => guard,
            Ok(None) => return UpdateOutcome::Skipped(SkipReason::InProgress),
            Err(e) => return UpdateOutcome::Failed(e),
        };
        self.install().await
    }

    /// Remove bundles other than the active one.
    ///
    /// Does nothing while another install or sweep holds the lock.
    pub async fn cleanup_old_render(&self) -> anyhow::Result<()> {
        let Some(_guard) = self.try_enter().await? else {
            info!("Update in progress, skipping cleanup");
            return Ok(());
        };
        sweeper::cleanup_old_render(&self.update_root).await
    }

    /// Entry document of the installed bundle, if any.
    pub async fn load_dynamic_render_entry(&self) -> Option<PathBuf> {
        entry::load_dynamic_render_entry(&self.update_root).await
    }

    /// Install then sweep, holding the lock for both.
    ///
    /// A failing sweep is logged and does not change the outcome.
    pub async fn run(&self) -> UpdateOutcome {
        if !self.config.enable_render_hot_update {
            return UpdateOutcome::Skipped(SkipReason::Disabled);
        }
        let _guard = match self.try_enter().await {
            Ok(Some(guard)) => guard,
            Ok(None) => return UpdateOutcome::Skipped(SkipReason::InProgress),
            Err(e) => return UpdateOutcome::Failed(e),
        };

        let outcome = self.install().await;
        if let Err(e) = sweeper::cleanup_old_render(&self.update_root).await {
            warn!(error = ?e, "Failed to clean up old render bundles");
        }
        outcome
    }

    async fn install(&self) -> UpdateOutcome {
        let manifest = match self.evaluate().await {
            GateDecision::Proceed(manifest) => manifest,
            GateDecision::Skip(reason) => {
                debug!(%reason, "Render update skipped");
                return UpdateOutcome::Skipped(reason);
            }
        };
        info!(version = %manifest.version, "Updating render bundle");

        let archive = match self.download_render_asset(&manifest).await {
            Ok(path) => path,
            Err(e) => return UpdateOutcome::Failed(e),
        };

        let staged = match installer::stage_archive(&self.update_root, &archive).await {
            Ok(staged) => staged,
            Err(e) => return UpdateOutcome::Failed(e),
        };

        // Record what the cache holds now, not what was downloaded earlier.
        let Some(current) = self.client.latest_release_manifest().await else {
            return UpdateOutcome::Skipped(SkipReason::ManifestUnavailable);
        };

        if let Err(e) = staged.promote(&current).await {
            return UpdateOutcome::Failed(e);
        }

        let version = current.version;
        self.events.emit(UpdateEvent::RenderUpdated {
            version: version.clone(),
        });

        if !self.window.ready_to_update() {
            warn!(%version, "Render bundle installed but no window to notify");
            return UpdateOutcome::Failed(UpdateError::NoWindow { version });
        }

        UpdateOutcome::Applied { version }
    }

    async fn try_enter(&self) -> Result<Option<FlightGuard<'_>>, UpdateError> {
        let Ok(local) = self.in_flight.try_lock() else {
            return Ok(None);
        };
        let Some(file) = UpdateLock::try_acquire(&self.update_root).await? else {
            return Ok(None);
        };
        Ok(Some(FlightGuard {
            _local: local,
            _file: file,
        }))
    }
}
