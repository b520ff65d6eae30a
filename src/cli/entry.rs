//! `entry`: print where the shell should load the renderer from.

use anyhow::Result;
use clap::Args;

use super::CliConfig;
use super::common::build_updater;

/// Print the entry document of the installed bundle.
///
/// Prints the absolute path on stdout, or a note on stderr when the shell
/// should use its built-in renderer.
#[derive(Args, Debug)]
pub struct EntryCommand {}

impl EntryCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let updater = build_updater(cli).await?;
        match updater.load_dynamic_render_entry().await {
            Some(path) => println!("{}", path.display()),
            None => eprintln!("No installed renderer bundle; using the built-in renderer"),
        }
        Ok(())
    }
}
