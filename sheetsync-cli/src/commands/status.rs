//! `sheetsync status` — dirty-record visibility.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use sheetsync_core::{store, Order};

/// Arguments for `sheetsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let book = store::load_at(&home).context("failed to load order store")?;

        if self.json {
            print_json(&book.orders)?;
            return Ok(());
        }

        print_table(&book.orders);
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusJson {
    summary: StatusSummaryJson,
    orders: Vec<OrderStatusJson>,
}

#[derive(Serialize)]
struct StatusSummaryJson {
    orders: usize,
    dirty: usize,
}

#[derive(Serialize)]
struct OrderStatusJson {
    order_number: String,
    sheet: String,
    tab: String,
    status: String,
    dirty: bool,
    dirty_since: Option<String>,
    updated_at: String,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "order")]
    order: String,
    #[tabled(rename = "sheet")]
    sheet: String,
    #[tabled(rename = "tab")]
    tab: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "sync")]
    sync: String,
    #[tabled(rename = "age")]
    age: String,
}

fn print_json(orders: &[Order]) -> Result<()> {
    let dirty = orders.iter().filter(|o| o.is_dirty()).count();
    let payload = StatusJson {
        summary: StatusSummaryJson {
            orders: orders.len(),
            dirty,
        },
        orders: orders
            .iter()
            .map(|o| OrderStatusJson {
                order_number: o.order_number.0.clone(),
                sheet: o.target_sheet_id.0.clone(),
                tab: o.target_tab_name.0.clone(),
                status: o.status.to_string(),
                dirty: o.is_dirty(),
                dirty_since: o.dirty_since.map(|t| t.to_rfc3339()),
                updated_at: o.updated_at.to_rfc3339(),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(orders: &[Order]) {
    let dirty = orders.iter().filter(|o| o.is_dirty()).count();
    println!(
        "Sheetsync v{} | {} orders | {} dirty",
        env!("CARGO_PKG_VERSION"),
        orders.len(),
        dirty,
    );

    if orders.is_empty() {
        println!("No orders registered.");
        return;
    }

    println!(
        "Indicators: {} SYNCED  {} DIRTY",
        "■".green().bold(),
        "■".yellow().bold(),
    );

    let rows: Vec<StatusTableRow> = orders
        .iter()
        .map(|o| StatusTableRow {
            order: o.order_number.0.clone(),
            sheet: o.target_sheet_id.0.clone(),
            tab: o.target_tab_name.0.clone(),
            status: o.status.to_string(),
            sync: sync_label(o),
            age: age_cell(o),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if dirty > 0 {
        println!("Run 'sheetsync sync' to push dirty orders.");
    }
}

fn sync_label(order: &Order) -> String {
    if order.is_dirty() {
        format!("{} DIRTY", "■".yellow().bold())
    } else {
        format!("{} SYNCED", "■".green().bold())
    }
}

/// How long the record has been dirty, or how long ago a clean record was
/// last touched.
fn age_cell(order: &Order) -> String {
    match order.dirty_since {
        Some(since) => format_age(since),
        None => format_age(order.updated_at),
    }
}

fn format_age(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0) as u64;
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}
