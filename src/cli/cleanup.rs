//! `cleanup`: sweep old bundles.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use super::common::build_updater;

/// Remove renderer bundles other than the active one.
#[derive(Args, Debug)]
pub struct CleanupCommand {}

impl CleanupCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let updater = build_updater(cli).await?;
        updater.cleanup_old_render().await?;
        println!("{} {}", "Cleaned".green().bold(), updater.update_root().display());
        Ok(())
    }
}
