//! `config`: manage the updater configuration file.
//!
//! ```bash
//! render-updater config            # same as `config show`
//! render-updater config init       # write a file with the defaults
//! render-updater config path       # print where the file is read from
//! ```

use crate::config::UpdaterConfig;
use crate::constants::CONFIG_PATH_ENV;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

/// Configuration file management.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Print the effective configuration as TOML.
    Show,

    /// Write a configuration file holding the defaults.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file path.
    Path,
}

impl ConfigCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        match self.command {
            Some(ConfigSubcommands::Show) | None => Self::show(config_path).await,
            Some(ConfigSubcommands::Init {
                force,
            }) => Self::init(force, config_path).await,
            Some(ConfigSubcommands::Path) => {
                println!("{}", resolve_path(config_path)?.display());
                Ok(())
            }
        }
    }

    async fn show(config_path: Option<PathBuf>) -> Result<()> {
        let config = UpdaterConfig::load_with_optional(config_path).await?;
        let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
        println!("{rendered}");
        println!("{} {}", "update root:".bold(), config.update_root()?.display());
        println!("{} {}", "download dir:".bold(), config.download_dir().display());
        Ok(())
    }

    async fn init(force: bool, config_path: Option<PathBuf>) -> Result<()> {
        let path = resolve_path(config_path)?;
        if path.exists() && !force {
            println!("{} config already exists at: {}", "Skipped:".yellow(), path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }

        UpdaterConfig::default().save_to(&path).await?;
        println!("{} {}", "Created config at:".green(), path.display());
        Ok(())
    }
}

fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => Ok(PathBuf::from(path)),
        None => UpdaterConfig::default_path(),
    }
}
