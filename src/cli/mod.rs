//! Command-line driver for the renderer hot updater.
//!
//! The binary stands in for the desktop shell: it builds a [`HotUpdater`]
//! from the configuration file and runs one pipeline stage per subcommand.
//!
//! # Available Commands
//!
//! - `check` - Evaluate the version gate and report whether an update applies
//! - `update` - Download, verify and install the latest bundle, then sweep
//! - `cleanup` - Remove bundles other than the active one
//! - `entry` - Print the entry document the shell should load
//! - `config` - Show, initialize or locate the configuration file
//!
//! # Examples
//!
//! ```bash
//! render-updater check --app-version 0.3.0
//! render-updater update --app-version 0.3.0 --app-commit abc123
//! render-updater entry
//! render-updater --config ./updater.toml config show
//! ```
//!
//! # Logging
//!
//! Logs go to stderr through `tracing-subscriber`. `--verbose` enables debug
//! output, `--quiet` disables logging, and `RUST_LOG` overrides both.

mod check;
mod cleanup;
mod common;
mod config;
mod entry;
mod update;

use crate::gate::AppInfo;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use common::{ConsoleHostUpdater, ConsoleWindow};

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log filter; `None` disables logging unless `RUST_LOG` is set.
    pub log_level: Option<String>,
    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,
    /// Identity of the app being updated.
    pub app: Option<AppInfo>,
}

impl CliConfig {
    /// Install the global tracing subscriber.
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub fn init_logging(&self) {
        let filter = match (std::env::var("RUST_LOG"), &self.log_level) {
            (Ok(_), _) => EnvFilter::from_default_env(),
            (Err(_), Some(level)) => EnvFilter::new(format!("render_updater={level}")),
            (Err(_), None) => return,
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// App identity from the flags, falling back to the build's own.
    #[must_use]
    pub fn app_info(&self) -> AppInfo {
        self.app.clone().unwrap_or_else(AppInfo::current)
    }
}

/// Renderer hot-update driver.
#[derive(Parser, Debug)]
#[command(
    name = "render-updater",
    about = "Download, verify and install renderer bundles for the desktop shell",
    version,
    long_about = None
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging. Results are still printed.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    ///
    /// Defaults to `$RENDER_UPDATER_CONFIG`, then the platform data directory.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Version of the running app (defaults to this binary's version).
    #[arg(long, global = true)]
    app_version: Option<String>,

    /// Commit the running renderer was built from.
    #[arg(long, global = true, default_value = "")]
    app_commit: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate the version gate without downloading anything.
    Check(check::CheckCommand),

    /// Install the latest renderer bundle and remove old ones.
    Update(update::UpdateCommand),

    /// Remove renderer bundles other than the active one.
    Cleanup(cleanup::CleanupCommand),

    /// Print the entry document of the installed bundle.
    Entry(entry::EntryCommand),

    /// Manage the configuration file.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Settings implied by the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        let app = self
            .app_version
            .as_ref()
            .map(|version| AppInfo::new(version.clone(), self.app_commit.clone()));

        CliConfig {
            log_level,
            config_path: self.config.clone(),
            app,
        }
    }

    /// Execute with explicit settings.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Check(cmd) => cmd.execute(&config).await,
            Commands::Update(cmd) => cmd.execute(&config).await,
            Commands::Cleanup(cmd) => cmd.execute(&config).await,
            Commands::Entry(cmd) => cmd.execute(&config).await,
            Commands::Config(cmd) => cmd.execute(config.config_path).await,
        }
    }
}
