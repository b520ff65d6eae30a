use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_API_BASE_URL, DEFAULT_DOWNLOAD_BASE_URL, DEFAULT_GITHUB_OWNER,
    DEFAULT_GITHUB_REPO, DOWNLOAD_DIR_NAME,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Settings for the renderer hot-update pipeline.
///
/// # Defaults
///
/// - hot update enabled
/// - releases from `RSSNext/Follow` on github.com
/// - update root under the platform's local data directory
/// - downloads under the system temp directory
/// - system proxy settings, no request timeout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// Feature flag gating the whole pipeline.
    #[serde(default = "default_enabled")]
    pub enable_render_hot_update: bool,

    /// GitHub owner of the release repository.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// GitHub repository name.
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Base URL of the releases REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL release assets are downloaded from.
    #[serde(default = "default_download_base_url")]
    pub download_base_url: String,

    /// Directory holding installed renderer versions and the installed manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_root: Option<PathBuf>,

    /// Directory downloaded archives are written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,

    /// Proxy URL for all release-host requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Per-request timeout in seconds; unset means wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

fn default_owner() -> String {
    DEFAULT_GITHUB_OWNER.to_string()
}

fn default_repo() -> String {
    DEFAULT_GITHUB_REPO.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_download_base_url() -> String {
    DEFAULT_DOWNLOAD_BASE_URL.to_string()
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            enable_render_hot_update: default_enabled(),
            owner: default_owner(),
            repo: default_repo(),
            api_base_url: default_api_base_url(),
            download_base_url: default_download_base_url(),
            update_root: None,
            download_dir: None,
            proxy: None,
            request_timeout_secs: None,
        }
    }
}

impl UpdaterConfig {
    /// Load from the default location, or defaults if the file is absent.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, else the env override, else the default path.
    ///
    /// Only an explicitly requested file must exist.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(&path).await;
        }
        let path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(env_path) => PathBuf::from(env_path),
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load and parse a TOML configuration file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read updater config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse updater config from {}", path.display()))
    }

    /// Write the configuration as TOML, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize updater config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write updater config to {}", path.display()))
    }

    /// Platform default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("config.toml"))
    }

    fn data_dir() -> Result<PathBuf> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?;
        Ok(base.join("render-updater"))
    }

    /// Resolved update root.
    pub fn update_root(&self) -> Result<PathBuf> {
        match &self.update_root {
            Some(root) => Ok(root.clone()),
            None => Ok(Self::data_dir()?.join("render")),
        }
    }

    /// Resolved download directory.
    #[must_use]
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| std::env::temp_dir().join(DOWNLOAD_DIR_NAME))
    }

    /// `<api>/repos/<owner>/<repo>/releases`
    #[must_use]
    pub fn releases_api_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_base_url.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    /// `<download>/<owner>/<repo>/releases/download`
    #[must_use]
    pub fn releases_download_url(&self) -> String {
        format!(
            "{}/{}/{}/releases/download",
            self.download_base_url.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    /// Request timeout, if configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
