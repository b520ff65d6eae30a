//! Fixed names and defaults shared across the updater.
//!
//! File names here are part of the on-disk contract with the desktop shell
//! and the release pipeline that publishes renderer bundles, so they must not
//! change independently of those.

/// Name of the manifest asset attached to every release.
pub const RELEASE_MANIFEST_FILENAME: &str = "manifest.yml";

/// Name of the installed manifest inside the update root.
///
/// The content is JSON; the shell reads it with a YAML loader, which accepts
/// JSON as well.
pub const INSTALLED_MANIFEST_FILENAME: &str = "manifest.yml";

/// Entry document of a renderer bundle.
pub const ENTRY_FILENAME: &str = "index.html";

/// Top-level directory every renderer archive unpacks to.
pub const ARCHIVE_ROOT_DIR: &str = "renderer";

/// Prefix of the per-run staging directory created inside the update root.
pub const STAGING_DIR_PREFIX: &str = ".staging-";

/// Marker that identifies nightly builds and nightly release tags.
pub const NIGHTLY_MARKER: &str = "nightly";

/// Name of the temporary download directory under the system temp dir.
pub const DOWNLOAD_DIR_NAME: &str = "follow-render-update";

/// Default GitHub owner of the release repository.
pub const DEFAULT_GITHUB_OWNER: &str = "RSSNext";

/// Default GitHub repository that hosts renderer releases.
pub const DEFAULT_GITHUB_REPO: &str = "Follow";

/// Default GitHub REST API base.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default GitHub web base used for release downloads.
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://github.com";

/// User agent sent with every request; GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("render-updater/", env!("CARGO_PKG_VERSION"));

/// Hosts that never go through a configured proxy.
pub const PROXY_BYPASS: &str = "localhost,127.0.0.1,::1";

/// Environment variable that overrides the configuration file location.
pub const CONFIG_PATH_ENV: &str = "RENDER_UPDATER_CONFIG";
