//! render-updater CLI entry point
//!
//! Parses arguments, runs the requested pipeline stage and turns errors into
//! user-facing messages with a non-zero exit code.

use anyhow::Result;
use clap::Parser;
use render_updater::cli;
use render_updater::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
