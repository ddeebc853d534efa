//! `sheetsync daemon` — background scheduler management.

use anyhow::{Context, Result};
use clap::Subcommand;

/// Subcommands for `sheetsync daemon`.
#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Run the scheduler in the foreground (supervise with systemd or
    /// similar).
    Run,
}

pub fn run(command: DaemonCommand) -> Result<()> {
    match command {
        DaemonCommand::Run => {
            let home = dirs::home_dir().context("could not determine home directory")?;
            sheetsync_daemon::start_blocking(&home).context("scheduler exited with an error")?;
            Ok(())
        }
    }
}
