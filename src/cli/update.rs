//! `update`: run the install pipeline.

use crate::updater::UpdateOutcome;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use super::common::build_updater;

/// Install the latest renderer bundle.
///
/// Exits non-zero only when the attempt fails; a skipped update is a
/// successful run.
#[derive(Args, Debug)]
pub struct UpdateCommand {
    /// Keep bundles other than the active one.
    #[arg(long)]
    no_cleanup: bool,
}

impl UpdateCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let updater = build_updater(cli).await?;

        let outcome = if self.no_cleanup {
            updater.hot_update_render().await
        } else {
            updater.run().await
        };
        // The shell update runs in the background; let it finish before exit.
        updater.shell_update().join().await;

        match outcome {
            UpdateOutcome::Applied { version } => {
                println!("{} renderer {version}", "Installed".green().bold());
                Ok(())
            }
            UpdateOutcome::Skipped(reason) => {
                println!("{} {reason}", "No update:".yellow());
                Ok(())
            }
            UpdateOutcome::Failed(error) => Err(error.into()),
        }
    }
}
