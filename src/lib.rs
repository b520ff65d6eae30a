//! Renderer hot updater for a desktop feed reader
//!
//! The desktop app ships a native shell plus a renderer bundle (HTML, JS,
//! assets). Renderer changes are published as releases on GitHub; this crate
//! lets the shell pick them up without a full app update by downloading the
//! new bundle, checking it, unpacking it next to older ones and pointing the
//! shell at it on the next start.
//!
//! # Architecture Overview
//!
//! ```text
//! release host ──> [release] ──> [gate] ──> [asset] ──> [installer] ──> [sweeper]
//!                   manifest     decide     download     stage,          keep only
//!                   + tag        or skip    + SHA-256    rename,         the active
//!                   (memoized)                           record          version
//!                                                                  │
//!                                         [entry] <── shell start ─┘
//! ```
//!
//! [`updater::HotUpdater`] owns the pipeline and reports each attempt as an
//! [`updater::UpdateOutcome`]. Everything it needs from the host application
//! (shell auto-updater, window bridge, telemetry) is a trait in [`host`].
//!
//! # Core Modules
//!
//! - [`release`] - Release metadata client with a per-client cache
//! - [`gate`] - Version gate and update policy
//! - [`asset`] - Archive download and SHA-256 verification
//! - [`installer`] - Staged extraction and atomic promotion
//! - [`sweeper`] - Removal of inactive bundles
//! - [`entry`] - Entry document lookup for the shell
//! - [`updater`] - Pipeline orchestration and single-flight locking
//!
//! ## Supporting Modules
//!
//! - [`manifest`] - Release manifest model and installed-manifest I/O
//! - [`host`] - Collaborator traits and default implementations
//! - [`lock`] - Cross-process update lock
//! - [`config`] - TOML configuration
//! - [`proxy`] - Proxy URL handling for the HTTP client
//! - [`core`] - Error types and user-facing error rendering
//! - [`cli`] - Command-line driver
//!
//! # Update Root Layout
//!
//! ```text
//! <update-root>/
//!   manifest.yml     installed manifest (JSON), names the active version
//!   1.2.0/           active bundle
//!     index.html     entry document
//!     ...
//! ```

pub mod asset;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod entry;
pub mod gate;
pub mod host;
pub mod installer;
pub mod lock;
pub mod manifest;
pub mod proxy;
pub mod release;
pub mod sweeper;
pub mod updater;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
