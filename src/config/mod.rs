//! Updater configuration.
//!
//! The configuration is a small TOML file. Every field has a default, so a
//! missing file is the same as an empty one:
//!
//! ```toml
//! enable_render_hot_update = true
//! owner = "RSSNext"
//! repo = "Follow"
//! update_root = "/home/me/.local/share/render-updater/render"
//! proxy = "socks5://127.0.0.1:1080"
//! request_timeout_secs = 60
//! ```
//!
//! The file location is resolved in order: explicit `--config` path, the
//! `RENDER_UPDATER_CONFIG` environment variable, then the platform default
//! from [`UpdaterConfig::default_path`].

mod updater_config;

pub use updater_config::UpdaterConfig;
