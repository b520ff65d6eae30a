//! Pieces shared by the subcommands.

use crate::config::UpdaterConfig;
use crate::host::{HostUpdater, TracingSink, WindowBridge};
use crate::updater::HotUpdater;
use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use std::sync::Arc;

use super::CliConfig;

/// Window bridge for a terminal session: the "window" is stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleWindow;

impl WindowBridge for ConsoleWindow {
    fn ready_to_update(&self) -> bool {
        println!("{}", "New renderer bundle is ready; it loads on the next start.".cyan());
        true
    }
}

/// Host updater for a terminal session: tells the user to update the shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleHostUpdater;

#[async_trait]
impl HostUpdater for ConsoleHostUpdater {
    async fn check_for_updates(&self) -> Result<()> {
        println!(
            "{} the latest renderer needs a newer app; install the latest desktop release",
            "Note:".yellow().bold()
        );
        Ok(())
    }

    async fn download_update(&self) -> Result<()> {
        Ok(())
    }
}

/// Load the configuration the flags point at.
pub async fn load_config(cli: &CliConfig) -> Result<UpdaterConfig> {
    UpdaterConfig::load_with_optional(cli.config_path.clone()).await
}

/// Updater wired to the console collaborators.
pub async fn build_updater(cli: &CliConfig) -> Result<HotUpdater> {
    let config = load_config(cli).await?;
    let updater = HotUpdater::new(config, cli.app_info())
        .context("Failed to set up the render updater")?
        .with_host_updater(Arc::new(ConsoleHostUpdater))
        .with_window(Arc::new(ConsoleWindow))
        .with_events(Arc::new(TracingSink));
    Ok(updater)
}
