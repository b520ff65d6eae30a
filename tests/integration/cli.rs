//! The `render-updater` binary

use crate::common::{ReleaseServer, Workspace, bundle_archive};
use assert_cmd::Command;
use predicates::prelude::*;
use render_updater::config::UpdaterConfig;
use render_updater::test_utils::manifest_for;

fn render_updater() -> Command {
    let mut cmd = Command::cargo_bin("render-updater").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("RENDER_UPDATER_CONFIG");
    cmd
}

fn offline_config(workspace: &Workspace) -> UpdaterConfig {
    UpdaterConfig {
        api_base_url: "http://127.0.0.1:1".to_string(),
        download_base_url: "http://127.0.0.1:1".to_string(),
        update_root: Some(workspace.update_root()),
        download_dir: Some(workspace.download_dir()),
        ..UpdaterConfig::default()
    }
}

#[test]
fn test_help_lists_commands() {
    render_updater()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("entry"))
        .stdout(predicate::str::contains("cleanup"));
}

#[test]
fn test_config_path_uses_flag() {
    let workspace = Workspace::new();
    let path = workspace.path().join("custom.toml");

    render_updater()
        .args(["--quiet", "--config"])
        .arg(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_then_show() {
    let workspace = Workspace::new();
    let path = workspace.path().join("updater.toml");

    render_updater()
        .arg("--config")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(path.is_file());

    render_updater()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("enable_render_hot_update = true"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let workspace = Workspace::new();

    render_updater()
        .arg("--config")
        .arg(workspace.path().join("absent.toml"))
        .arg("entry")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_entry_without_install() {
    let workspace = Workspace::new();
    let config = workspace.write_config(&offline_config(&workspace));

    render_updater()
        .arg("--config")
        .arg(&config)
        .arg("entry")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("built-in renderer"));
}

#[test]
fn test_update_unreachable_host_is_skipped() {
    let workspace = Workspace::new();
    let config = workspace.write_config(&offline_config(&workspace));

    render_updater()
        .args(["--quiet", "--app-version", "1.0.0", "--config"])
        .arg(&config)
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("release manifest unavailable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_then_entry() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    server.publish("v1.2.0", "1.2.0", "release-commit").await;
    let config = workspace.write_config(&server.config(&workspace));

    render_updater()
        .args(["--quiet", "--app-version", "1.0.0", "--config"])
        .arg(&config)
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed"))
        .stdout(predicate::str::contains("1.2.0"));

    render_updater()
        .arg("--config")
        .arg(&config)
        .arg("entry")
        .assert()
        .success()
        .stdout(predicate::str::contains("index.html"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_with_corrupt_asset_fails() {
    let server = ReleaseServer::start().await;
    let workspace = Workspace::new();
    let archive = bundle_archive("1.2.0");
    let mut manifest = manifest_for("1.2.0", "release-commit", &archive);
    manifest.hash = "f".repeat(64);
    server.mount_latest("v1.2.0", 1).await;
    server.mount_manifest("v1.2.0", &manifest, 1).await;
    server.mount_archive("v1.2.0", &manifest.filename, archive, 1).await;
    let config = workspace.write_config(&server.config(&workspace));

    render_updater()
        .args(["--quiet", "--app-version", "1.0.0", "--config"])
        .arg(&config)
        .arg("update")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Checksum mismatch"));
}
