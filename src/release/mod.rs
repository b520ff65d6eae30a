//! Release metadata client.
//!
//! Resolves which GitHub release the renderer should follow and fetches that
//! release's `manifest.yml`.
//!
//! # Channels
//!
//! - **Stable** builds follow `GET <api>/releases/latest`.
//! - **Nightly** builds (app version contains `nightly`) list all releases and
//!   take the first pre-release whose tag contains `nightly`. If there is none,
//!   the first release in the list is used.
//!
//! Both lookups are memoized in a [`ReleaseCache`] for the lifetime of the
//! client.
//!
//! # Example
//!
//! ```rust,no_run
//! use render_updater::config::UpdaterConfig;
//! use render_updater::release::{ReleaseChannel, ReleaseClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = UpdaterConfig::default();
//! let client = ReleaseClient::new(&config, ReleaseChannel::for_version("0.3.0"))?;
//! if let Some(manifest) = client.latest_release_manifest().await {
//!     println!("latest renderer: {}", manifest.version);
//! }
//! # Ok(())
//! # }
//! ```

mod cache;

pub use cache::ReleaseCache;

use crate::config::UpdaterConfig;
use crate::constants::{NIGHTLY_MARKER, RELEASE_MANIFEST_FILENAME, USER_AGENT};
use crate::core::UpdateError;
use crate::manifest::{ReleaseManifest, parse_release_manifest};
use crate::proxy::build_proxy;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Which release track to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseChannel {
    /// Latest non-prerelease.
    Stable,
    /// Most recent nightly pre-release.
    Nightly,
}

impl ReleaseChannel {
    /// Channel implied by the running app version.
    #[must_use]
    pub fn for_version(app_version: &str) -> Self {
        if app_version.contains(NIGHTLY_MARKER) {
            Self::Nightly
        } else {
            Self::Stable
        }
    }
}

/// The parts of a GitHub release descriptor the updater reads.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    /// Tag name (e.g. `"v0.3.0"` or `"nightly-20240101"`).
    pub tag_name: String,
    /// Whether the release is flagged as a pre-release.
    #[serde(default)]
    pub prerelease: bool,
}

/// Pick the nightly tag from a release list in host order.
///
/// Falls back to the first entry when no nightly pre-release is listed.
#[must_use]
pub fn select_nightly_tag(releases: &[GitHubRelease]) -> Option<&str> {
    if let Some(nightly) =
        releases.iter().find(|r| r.prerelease && r.tag_name.contains(NIGHTLY_MARKER))
    {
        return Some(&nightly.tag_name);
    }
    let first = releases.first()?;
    warn!(tag = %first.tag_name, "No nightly pre-release found, falling back to first release");
    Some(&first.tag_name)
}

/// HTTP client for release metadata and assets.
#[derive(Debug)]
pub struct ReleaseClient {
    http: reqwest::Client,
    api_url: String,
    download_url: String,
    repo: String,
    channel: ReleaseChannel,
    cache: ReleaseCache,
}

impl ReleaseClient {
    /// Build a client from configuration.
    ///
    /// Applies the configured proxy (ignored when invalid) and request timeout.
    pub fn new(config: &UpdaterConfig, channel: ReleaseChannel) -> Result<Self, UpdateError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);

        if let Some(proxy) = config.proxy.as_deref().and_then(build_proxy) {
            builder = builder.proxy(proxy);
        }
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(|e| UpdateError::Config {
            message: format!("Failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            http,
            api_url: config.releases_api_url(),
            download_url: config.releases_download_url(),
            repo: format!("{}/{}", config.owner, config.repo),
            channel,
            cache: ReleaseCache::new(),
        })
    }

    /// Channel this client follows.
    #[must_use]
    pub const fn channel(&self) -> ReleaseChannel {
        self.channel
    }

    /// The memo of remote lookups, for resetting or seeding.
    #[must_use]
    pub const fn cache(&self) -> &ReleaseCache {
        &self.cache
    }

    /// Tag of the release to follow. One network lookup per client.
    pub async fn latest_release_tag(&self) -> Result<String, UpdateError> {
        let mut slot = self.cache.tag.lock().await;
        if let Some(tag) = slot.as_ref() {
            return Ok(tag.clone());
        }

        let tag = match self.channel {
            ReleaseChannel::Stable => {
                let url = format!("{}/latest", self.api_url);
                let release: GitHubRelease = self.get_json(&url, "latest release").await?;
                release.tag_name
            }
            ReleaseChannel::Nightly => {
                let releases: Vec<GitHubRelease> =
                    self.get_json(&self.api_url, "release list").await?;
                select_nightly_tag(&releases)
                    .map(str::to_string)
                    .ok_or_else(|| UpdateError::NoReleases {
                        repo: self.repo.clone(),
                    })?
            }
        };

        debug!(tag = %tag, channel = ?self.channel, "Resolved release tag");
        *slot = Some(tag.clone());
        Ok(tag)
    }

    /// Download URL of a file attached to the followed release.
    pub async fn file_download_url(&self, filename: &str) -> Result<String, UpdateError> {
        let tag = self.latest_release_tag().await?;
        Ok(format!("{}/{}/{}", self.download_url, tag, filename))
    }

    /// Manifest of the followed release, or the reason it is unavailable.
    pub async fn try_latest_release_manifest(&self) -> Result<ReleaseManifest, UpdateError> {
        let mut slot = self.cache.manifest.lock().await;
        if let Some(manifest) = slot.as_ref() {
            return Ok(manifest.clone());
        }

        let url = self.file_download_url(RELEASE_MANIFEST_FILENAME).await?;
        let text = self
            .get(&url)
            .await?
            .text()
            .await
            .map_err(|e| network_error(&url, &e))?;
        let manifest = parse_release_manifest(&text)?;

        info!(
            version = %manifest.version,
            commit = %manifest.commit,
            minimum = %manifest.minimum,
            "Fetched release manifest"
        );
        *slot = Some(manifest.clone());
        Ok(manifest)
    }

    /// Manifest of the followed release; `None` when it cannot be fetched or parsed.
    ///
    /// Absence means "no update available right now", never a fatal error.
    pub async fn latest_release_manifest(&self) -> Option<ReleaseManifest> {
        match self.try_latest_release_manifest().await {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!(error = %e, "Release manifest unavailable");
                None
            }
        }
    }

    /// Fetch a release asset into memory.
    pub async fn download_file(&self, url: &str) -> Result<Vec<u8>, UpdateError> {
        let bytes = self.get(url).await?.bytes().await.map_err(|e| network_error(url, &e))?;
        debug!(url, size = bytes.len(), "Downloaded release asset");
        Ok(bytes.to_vec())
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, UpdateError> {
        debug!(url, "GET");
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json, */*")
            .send()
            .await
            .map_err(|e| network_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        what: &str,
    ) -> Result<T, UpdateError> {
        let text = self.get(url).await?.text().await.map_err(|e| network_error(url, &e))?;
        serde_json::from_str(&text).map_err(|e| UpdateError::Parse {
            what: what.to_string(),
            reason: e.to_string(),
        })
    }
}

fn network_error(url: &str, error: &reqwest::Error) -> UpdateError {
    UpdateError::Network {
        url: url.to_string(),
        reason: error.to_string(),
    }
}
