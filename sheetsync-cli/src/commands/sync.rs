//! `sheetsync sync` — run one reconciliation cycle in the foreground.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use sheetsync_core::{config, FileOrderStore};
use sheetsync_engine::{run_cycle_at, CycleReport, RowIndexCache, SyncOutcome};
use sheetsync_sheets::RestSheetsClient;

/// Arguments for `sheetsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Show what would be pushed without writing to any sheet or clearing
    /// any dirty marker.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let engine_config = config::load_at(&home).context("failed to load config")?;
        let store = FileOrderStore::new(&home);
        let mut cache = RowIndexCache::new();

        let report = run_cycle_at(
            &home,
            &store,
            || RestSheetsClient::from_env(&engine_config),
            &engine_config,
            &mut cache,
            self.dry_run,
        )
        .context("sync cycle failed")?;

        print_report(&report, self.dry_run);
        Ok(())
    }
}

fn print_report(report: &CycleReport, dry_run: bool) {
    if report.skipped {
        println!("cycle skipped — another sync is running (lock held)");
        return;
    }

    let prefix = if dry_run { "[dry-run] " } else { "" };
    if report.outcomes.is_empty() {
        println!("{prefix}✓ nothing to sync");
        return;
    }

    println!(
        "{prefix}✓ cycle finished ({} pushed, {} failed)",
        report.synced(),
        report.failed()
    );

    for entry in &report.outcomes {
        match &entry.outcome {
            SyncOutcome::Inserted => println!("  ✎  {} (new row)", entry.order_number),
            SyncOutcome::Updated => println!("  ↻  {} (updated)", entry.order_number),
            SyncOutcome::WouldInsert => println!("  ~  {} (would insert)", entry.order_number),
            SyncOutcome::WouldUpdate => println!("  ~  {} (would update)", entry.order_number),
            SyncOutcome::Failed(reason) => {
                println!("  ✗  {} ({reason})", entry.order_number)
            }
        }
    }
}
