//! Version gate decisions

use crate::common::{ReleaseServer, Workspace};
use render_updater::config::UpdaterConfig;
use render_updater::gate::{AppInfo, GateDecision, SkipReason, UpdatePolicy};
use render_updater::host::UpdateEvent;
use render_updater::manifest::{ReleaseManifest, write_installed_manifest};
use render_updater::test_utils::{CountingHostUpdater, RecordingSink, manifest_for};
use async_trait::async_trait;
use render_updater::host::HostUpdater;
use render_updater::updater::HotUpdater;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Treats every differing version as newer.
struct AlwaysNewer;

impl UpdatePolicy for AlwaysNewer {
    fn should_update(&self, _current: &str, _remote: &str) -> bool {
        true
    }

    fn host_supports(&self, _current: &str, _minimum: &str) -> bool {
        true
    }
}

/// Platform updater whose download never completes.
#[derive(Default)]
struct StalledDownload {
    checks: AtomicUsize,
}

#[async_trait]
impl HostUpdater for StalledDownload {
    async fn check_for_updates(&self) -> anyhow::Result<()> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn download_update(&self) -> anyhow::Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

struct Harness {
    updater: HotUpdater,
    host: Arc<CountingHostUpdater>,
    events: Arc<RecordingSink>,
}

fn harness(config: UpdaterConfig, app: AppInfo, host: CountingHostUpdater) -> Harness {
    let host = Arc::new(host);
    let events = Arc::new(RecordingSink::default());
    let updater = HotUpdater::new(config, app)
        .unwrap()
        .with_host_updater(host.clone())
        .with_events(events.clone());
    Harness {
        updater,
        host,
        events,
    }
}

async fn serve_manifest(server: &ReleaseServer, manifest: &ReleaseManifest) {
    server.mount_latest("v-release", 1).await;
    server.mount_manifest("v-release", manifest, 1).await;
}

#[tokio::test]
async fn test_newer_release_proceeds() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    let manifest = manifest_for("1.2.0", "new-commit", b"archive");
    serve_manifest(&server, &manifest).await;

    let h = harness(server.config(&workspace), AppInfo::new("1.0.0", "old-commit"), CountingHostUpdater::default());
    assert_eq!(h.updater.evaluate().await, GateDecision::Proceed(manifest));
    assert!(h.updater.can_update_render().await);
    assert!(h.events.events().is_empty());
}

#[tokio::test]
async fn test_older_release_is_not_newer() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    serve_manifest(&server, &manifest_for("0.9.0", "c", b"archive")).await;

    let h = harness(server.config(&workspace), AppInfo::new("1.0.0", "old"), CountingHostUpdater::default());
    assert_eq!(
        h.updater.evaluate().await,
        GateDecision::Skip(SkipReason::NotNewer {
            current: "1.0.0".to_string(),
            remote: "0.9.0".to_string(),
        })
    );
}

#[tokio::test]
async fn test_host_unsupported_requests_shell_update_once() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    let mut manifest = manifest_for("1.2.0", "new", b"archive");
    manifest.minimum = "1.5.0".to_string();
    serve_manifest(&server, &manifest).await;

    let h = harness(server.config(&workspace), AppInfo::new("1.0.0", "old"), CountingHostUpdater::default());
    let decision = h.updater.evaluate().await;
    h.updater.shell_update().join().await;

    assert_eq!(
        decision,
        GateDecision::Skip(SkipReason::HostUnsupported {
            current: "1.0.0".to_string(),
            minimum: "1.5.0".to_string(),
        })
    );
    assert_eq!(h.host.checks(), 1);
    assert_eq!(h.host.downloads(), 1);
    assert_eq!(
        h.events.events(),
        vec![UpdateEvent::HostNotSupported {
            app_version: "1.0.0".to_string(),
            manifest_version: "1.2.0".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_failed_shell_check_skips_download() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    let mut manifest = manifest_for("1.2.0", "new", b"archive");
    manifest.minimum = "1.5.0".to_string();
    serve_manifest(&server, &manifest).await;

    let h = harness(server.config(&workspace), AppInfo::new("1.0.0", "old"), CountingHostUpdater::failing());
    assert!(!h.updater.can_update_render().await);
    h.updater.shell_update().join().await;
    assert_eq!(h.host.checks(), 1);
    assert_eq!(h.host.downloads(), 0);
}

#[tokio::test]
async fn test_host_unsupported_wins_over_equal_commit_and_install() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    let mut manifest = manifest_for("2.0.0", "deadbeef", b"archive");
    manifest.minimum = "1.5.0".to_string();
    serve_manifest(&server, &manifest).await;
    write_installed_manifest(&workspace.update_root(), &manifest).await.unwrap();

    let h = harness(server.config(&workspace), AppInfo::new("1.0.0", "deadbeef"), CountingHostUpdater::default());
    let decision = h.updater.evaluate().await;
    h.updater.shell_update().join().await;

    assert_eq!(
        decision,
        GateDecision::Skip(SkipReason::HostUnsupported {
            current: "1.0.0".to_string(),
            minimum: "1.5.0".to_string(),
        })
    );
    assert_eq!(h.host.checks(), 1);
}

#[tokio::test]
async fn test_gate_does_not_wait_for_shell_download() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    let mut manifest = manifest_for("1.2.0", "new", b"archive");
    manifest.minimum = "1.5.0".to_string();
    serve_manifest(&server, &manifest).await;

    let host = Arc::new(StalledDownload::default());
    let updater = HotUpdater::new(server.config(&workspace), AppInfo::new("1.0.0", "old"))
        .unwrap()
        .with_host_updater(host.clone());

    let allowed = tokio::time::timeout(Duration::from_secs(5), updater.can_update_render())
        .await
        .expect("gate blocked on the shell download");
    assert!(!allowed);

    let outcome = tokio::time::timeout(Duration::from_secs(5), updater.run())
        .await
        .expect("pipeline blocked on the shell download");
    assert!(matches!(outcome.skip_reason(), Some(SkipReason::HostUnsupported { .. })));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(host.checks.load(Ordering::SeqCst), 2);
    assert!(updater.shell_update().is_running());
}

#[tokio::test]
async fn test_equal_version_is_skipped() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    serve_manifest(&server, &manifest_for("1.2.0", "new", b"archive")).await;

    let h = harness(server.config(&workspace), AppInfo::new("1.2.0", "old"), CountingHostUpdater::default());
    let updater = h.updater.with_policy(AlwaysNewer);
    assert_eq!(updater.evaluate().await, GateDecision::Skip(SkipReason::VersionEqual));
}

#[tokio::test]
async fn test_equal_commit_is_skipped() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    serve_manifest(&server, &manifest_for("1.2.0", "same-commit", b"archive")).await;

    let h = harness(server.config(&workspace), AppInfo::new("1.0.0", "same-commit"), CountingHostUpdater::default());
    assert_eq!(h.updater.evaluate().await, GateDecision::Skip(SkipReason::CommitEqual));
}

#[tokio::test]
async fn test_unknown_app_commit_never_matches() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    serve_manifest(&server, &manifest_for("1.2.0", "", b"archive")).await;

    let h = harness(server.config(&workspace), AppInfo::new("1.0.0", ""), CountingHostUpdater::default());
    assert!(h.updater.evaluate().await.should_update());
}

#[tokio::test]
async fn test_installed_version_is_skipped() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    let manifest = manifest_for("1.2.0", "new", b"archive");
    serve_manifest(&server, &manifest).await;
    write_installed_manifest(&workspace.update_root(), &manifest).await.unwrap();

    let h = harness(server.config(&workspace), AppInfo::new("1.0.0", "old"), CountingHostUpdater::default());
    assert_eq!(h.updater.evaluate().await, GateDecision::Skip(SkipReason::AlreadyInstalledVersion));
}

#[tokio::test]
async fn test_installed_commit_is_skipped() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    let manifest = manifest_for("1.2.1", "rebuilt", b"archive");
    serve_manifest(&server, &manifest).await;
    let installed = ReleaseManifest {
        version: "1.2.0".to_string(),
        ..manifest.clone()
    };
    write_installed_manifest(&workspace.update_root(), &installed).await.unwrap();

    let h = harness(server.config(&workspace), AppInfo::new("1.0.0", "old"), CountingHostUpdater::default());
    assert_eq!(h.updater.evaluate().await, GateDecision::Skip(SkipReason::AlreadyInstalledCommit));
}

#[tokio::test]
async fn test_disabled_never_contacts_host() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    server.mount_latest("v1.2.0", 0).await;

    let config = UpdaterConfig {
        enable_render_hot_update: false,
        ..server.config(&workspace)
    };
    let h = harness(config, AppInfo::new("1.0.0", "old"), CountingHostUpdater::default());
    assert_eq!(h.updater.evaluate().await, GateDecision::Skip(SkipReason::Disabled));
}
