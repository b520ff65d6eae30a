//! Test utilities for the render updater
//!
//! Shared by unit tests and, through the `test-utils` feature, by the
//! integration tests:
//! - [`fixtures`]: release manifests and renderer archives
//! - [`doubles`]: recording implementations of the host collaborators
//!
//! # Example
//!
//! ```rust,no_run
//! use render_updater::test_utils::{RecordingSink, build_render_archive};
//!
//! let archive = build_render_archive(&[("renderer/index.html", b"<html></html>")]);
//! let sink = RecordingSink::default();
//! assert!(sink.events().is_empty());
//! # let _ = archive;
//! ```

pub mod doubles;
pub mod fixtures;

pub use doubles::{CountingHostUpdater, RecordingSink, RecordingWindow};
pub use fixtures::{build_render_archive, manifest_for, manifest_yaml};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=render_updater=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
