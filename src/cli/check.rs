//! `check`: report what the version gate decides.

use crate::gate::GateDecision;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use super::common::build_updater;

/// Evaluate the version gate.
///
/// Fetches the release manifest but downloads no archive. Exits 0 whether or
/// not an update applies.
#[derive(Args, Debug)]
pub struct CheckCommand {}

impl CheckCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let updater = build_updater(cli).await?;

        let decision = updater.evaluate().await;
        updater.shell_update().join().await;

        match decision {
            GateDecision::Proceed(manifest) => {
                println!(
                    "{} renderer {} (commit {}) can be installed",
                    "Update available:".green().bold(),
                    manifest.version,
                    manifest.commit
                );
            }
            GateDecision::Skip(reason) => {
                println!("{} {reason}", "No update:".yellow());
            }
        }
        Ok(())
    }
}
