//! Download, verification, installation and sweeping

use crate::common::{ReleaseServer, Workspace, bundle_archive};
use render_updater::config::UpdaterConfig;
use render_updater::core::UpdateError;
use render_updater::gate::{AppInfo, SkipReason};
use render_updater::host::UpdateEvent;
use render_updater::manifest::{ReleaseManifest, read_installed_manifest, write_installed_manifest};
use render_updater::test_utils::{
    RecordingSink, RecordingWindow, build_render_archive, init_test_logging, manifest_for,
};
use render_updater::updater::{HotUpdater, UpdateOutcome};
use std::sync::Arc;

fn updater(
    config: UpdaterConfig,
    window: Arc<RecordingWindow>,
    events: Arc<RecordingSink>,
) -> HotUpdater {
    HotUpdater::new(config, AppInfo::new("1.0.0", "app-commit"))
        .unwrap()
        .with_window(window)
        .with_events(events)
}

#[tokio::test]
async fn test_full_update_installs_and_sweeps() {
    init_test_logging(None);
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    let manifest = server.publish("v1.2.0", "1.2.0", "release-commit").await;

    workspace.seed_version("1.1.0");
    let old = ReleaseManifest {
        version: "1.1.0".to_string(),
        commit: "old-commit".to_string(),
        ..manifest.clone()
    };
    write_installed_manifest(&workspace.update_root(), &old).await.unwrap();

    let window = Arc::new(RecordingWindow::present());
    let events = Arc::new(RecordingSink::default());
    let updater = updater(server.config(&workspace), window.clone(), events.clone());

    let outcome = updater.run().await;
    assert!(outcome.is_applied(), "unexpected outcome: {outcome:?}");

    let root = workspace.update_root();
    let index = std::fs::read_to_string(root.join("1.2.0/index.html")).unwrap();
    assert!(index.contains("renderer 1.2.0"));
    assert!(root.join("1.2.0/assets/index.js").is_file());
    assert!(!root.join("1.1.0").exists(), "old bundle should be swept");
    assert_eq!(read_installed_manifest(&root).await, Some(manifest.clone()));
    assert!(workspace.download_dir().join(&manifest.filename).is_file());

    assert_eq!(
        events.events(),
        vec![
            UpdateEvent::DownloadStarted {
                version: "1.2.0".to_string()
            },
            UpdateEvent::RenderUpdated {
                version: "1.2.0".to_string()
            },
        ]
    );
    assert_eq!(window.notified(), 1);
    assert_eq!(updater.load_dynamic_render_entry().await, Some(root.join("1.2.0/index.html")));
}

#[tokio::test]
async fn test_second_attempt_sees_installed_version() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    server.publish("v1.2.0", "1.2.0", "release-commit").await;

    let window = Arc::new(RecordingWindow::present());
    let events = Arc::new(RecordingSink::default());
    let updater = updater(server.config(&workspace), window, events.clone());

    assert!(updater.hot_update_render().await.is_applied());
    let second = updater.hot_update_render().await;
    assert_eq!(second.skip_reason(), Some(&SkipReason::AlreadyInstalledVersion));
    assert_eq!(events.events().len(), 2, "no second download");
}

#[tokio::test]
async fn test_hash_mismatch_is_not_installed() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    let archive = bundle_archive("1.2.0");
    let mut manifest = manifest_for("1.2.0", "release-commit", &archive);
    manifest.hash = "0".repeat(64);
    server.mount_latest("v1.2.0", 1).await;
    server.mount_manifest("v1.2.0", &manifest, 1).await;
    server.mount_archive("v1.2.0", &manifest.filename, archive, 1).await;

    let window = Arc::new(RecordingWindow::present());
    let events = Arc::new(RecordingSink::default());
    let updater = updater(server.config(&workspace), window.clone(), events.clone());

    let outcome = updater.hot_update_render().await;
    match outcome.error() {
        Some(UpdateError::ChecksumMismatch { expected, .. }) => assert_eq!(*expected, "0".repeat(64)),
        other => panic!("expected checksum mismatch, got {other:?}"),
    }

    assert!(!workspace.update_root().join("1.2.0").exists());
    assert!(read_installed_manifest(&workspace.update_root()).await.is_none());
    assert!(workspace.download_dir().join(&manifest.filename).is_file(), "rejected archive stays on disk");
    assert_eq!(window.notified(), 0);
    assert_eq!(
        events.events(),
        vec![UpdateEvent::DownloadStarted {
            version: "1.2.0".to_string()
        }]
    );
}

#[tokio::test]
async fn test_archive_without_renderer_dir_keeps_previous_install() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    let archive = build_render_archive(&[("dist/index.html", b"<html></html>")]);
    let manifest = manifest_for("1.2.0", "release-commit", &archive);
    server.mount_latest("v1.2.0", 1).await;
    server.mount_manifest("v1.2.0", &manifest, 1).await;
    server.mount_archive("v1.2.0", &manifest.filename, archive, 1).await;

    workspace.seed_version("1.1.0");
    let old = ReleaseManifest {
        version: "1.1.0".to_string(),
        commit: "old-commit".to_string(),
        ..manifest.clone()
    };
    write_installed_manifest(&workspace.update_root(), &old).await.unwrap();

    let updater = updater(
        server.config(&workspace),
        Arc::new(RecordingWindow::present()),
        Arc::new(RecordingSink::default()),
    );
    let outcome = updater.run().await;

    assert!(matches!(outcome.error(), Some(UpdateError::ArchiveLayout { .. })));
    assert_eq!(read_installed_manifest(&workspace.update_root()).await, Some(old));
    assert!(workspace.update_root().join("1.1.0/index.html").is_file());
    assert!(!workspace.update_root().join("1.2.0").exists());
}

#[tokio::test]
async fn test_no_window_reports_failure_but_installs() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    server.publish("v1.2.0", "1.2.0", "release-commit").await;

    let events = Arc::new(RecordingSink::default());
    let updater = updater(server.config(&workspace), Arc::new(RecordingWindow::absent()), events.clone());

    let outcome = updater.hot_update_render().await;
    assert!(matches!(outcome, UpdateOutcome::Failed(UpdateError::NoWindow { ref version }) if version == "1.2.0"));
    assert!(workspace.update_root().join("1.2.0/index.html").is_file());
    assert!(events.events().contains(&UpdateEvent::RenderUpdated {
        version: "1.2.0".to_string()
    }));
}

#[tokio::test]
async fn test_download_error_is_failure() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    let manifest = manifest_for("1.2.0", "release-commit", b"archive");
    server.mount_latest("v1.2.0", 1).await;
    server.mount_manifest("v1.2.0", &manifest, 1).await;
    server.mount_status("v1.2.0", &manifest.filename, 404, 1).await;

    let updater = updater(
        server.config(&workspace),
        Arc::new(RecordingWindow::present()),
        Arc::new(RecordingSink::default()),
    );
    let outcome = updater.hot_update_render().await;
    assert!(matches!(outcome.error(), Some(UpdateError::HttpStatus { status: 404, .. })));
    assert!(!workspace.update_root().join("1.2.0").exists());
}

#[tokio::test]
async fn test_concurrent_runs_are_single_flight() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    server.publish("v1.2.0", "1.2.0", "release-commit").await;

    let updater = updater(
        server.config(&workspace),
        Arc::new(RecordingWindow::present()),
        Arc::new(RecordingSink::default()),
    );
    let (first, second) = tokio::join!(updater.run(), updater.run());

    assert!(first.is_applied(), "unexpected outcome: {first:?}");
    assert_eq!(second.skip_reason(), Some(&SkipReason::InProgress));
}

#[tokio::test]
async fn test_cleanup_without_manifest_removes_root() {
    let workspace = Workspace::new();
    workspace.seed_version("1.0.0");
    let config = UpdaterConfig {
        update_root: Some(workspace.update_root()),
        ..UpdaterConfig::default()
    };
    let updater = HotUpdater::new(config, AppInfo::new("1.0.0", "")).unwrap();

    updater.cleanup_old_render().await.unwrap();
    assert!(!workspace.update_root().exists());
    assert!(updater.load_dynamic_render_entry().await.is_none());
}
