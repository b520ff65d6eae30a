//! Collaborators the updater talks to inside the host application.
//!
//! The pipeline never calls the desktop shell directly. Everything it needs
//! from its surroundings goes through one of these seams:
//!
//! - [`HostUpdater`]: the platform auto-updater for the native shell,
//!   used when a bundle needs a newer shell than the one running;
//! - [`WindowBridge`]: the window-messaging bridge used to tell the running UI
//!   that a new bundle is ready to load;
//! - [`EventSink`]: fire-and-forget telemetry, fed with [`UpdateEvent`]s.
//!
//! Default implementations that only log are provided for headless use.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

/// Platform auto-updater of the native shell.
#[async_trait]
pub trait HostUpdater: Send + Sync {
    /// Ask the platform updater to look for a shell release.
    async fn check_for_updates(&self) -> anyhow::Result<()>;

    /// Download the shell release found by the last check.
    async fn download_update(&self) -> anyhow::Result<()>;
}

/// Window-messaging bridge to the running renderer.
pub trait WindowBridge: Send + Sync {
    /// Tell the active window a new bundle is ready.
    ///
    /// Returns `false` when there is no application window to notify.
    fn ready_to_update(&self) -> bool;
}

/// Telemetry sink.
pub trait EventSink: Send + Sync {
    /// Record an event. Must not block.
    fn emit(&self, event: UpdateEvent);
}

/// Telemetry emitted by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UpdateEvent {
    /// The release needs a newer shell than the one running.
    HostNotSupported {
        /// Running shell version
        app_version: String,
        /// Version of the release that was refused
        manifest_version: String,
    },
    /// An archive download is about to start.
    DownloadStarted {
        /// Version being downloaded
        version: String,
    },
    /// A bundle was installed and recorded as active.
    RenderUpdated {
        /// Installed version
        version: String,
    },
}

/// Sink that writes events to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: UpdateEvent) {
        match &event {
            UpdateEvent::HostNotSupported {
                app_version,
                manifest_version,
            } => info!(%app_version, %manifest_version, "hot update: host not supported"),
            UpdateEvent::DownloadStarted { version } => info!(%version, "hot update: download"),
            UpdateEvent::RenderUpdated { version } => info!(%version, "hot update: render success"),
        }
    }
}

/// Host updater for environments without a platform updater.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHostUpdater;

#[async_trait]
impl HostUpdater for NoopHostUpdater {
    async fn check_for_updates(&self) -> anyhow::Result<()> {
        info!("No platform updater available; shell update check skipped");
        Ok(())
    }

    async fn download_update(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Window bridge for headless runs: there is never a window.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessWindow;

impl WindowBridge for HeadlessWindow {
    fn ready_to_update(&self) -> bool {
        false
    }
}
