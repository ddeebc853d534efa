//! The run coordinator: one lock-guarded pass over the dirty set.
//!
//! ## Cycle protocol
//!
//! 1. Acquire the `sheet-sync` lock — already held means another cycle is
//!    live; skip wholesale (info log, zero store/API traffic).
//! 2. Build the API client. Failure aborts the cycle before any record is
//!    read; the lock guard still releases on the way out.
//! 3. Select every order with a set dirty marker.
//! 4. Per record, independently: resolve variant → locate row → build row
//!    → upsert → clear the marker. Any error is contained to that record:
//!    logged with the order number, marker left set for the next cycle.
//! 5. Release the lock (RAII guard — every exit path).

use std::path::Path;
use std::time::Duration;

use sheetsync_core::{EngineConfig, Order, OrderNumber, OrderStore};
use sheetsync_sheets::{build_row, SheetsApi, SheetsError, VariantTable};

use crate::error::EngineError;
use crate::lock::SyncLock;
use crate::locator::RowIndexCache;
use crate::upsert::{upsert, SyncOutcome};

/// Name of the lock guarding sync cycles across processes.
pub const SYNC_LOCK_NAME: &str = "sheet-sync";

/// Per-order result within one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderOutcome {
    pub order_number: OrderNumber,
    pub outcome: SyncOutcome,
}

/// Summary of one [`run_cycle_at`] invocation.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// The lock was held by another cycle; nothing was read or written.
    pub skipped: bool,
    pub outcomes: Vec<OrderOutcome>,
}

impl CycleReport {
    fn lock_held() -> Self {
        Self {
            skipped: true,
            outcomes: vec![],
        }
    }

    /// Records pushed (or, in dry-run, that would have been pushed).
    pub fn synced(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !o.outcome.is_failure())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.synced()
    }
}

/// Run one sync cycle rooted at `home`.
///
/// `connect` builds the API client after the lock is won, so credential
/// problems surface inside the guarded section and abort cleanly. Lock
/// contention is not an error — the report comes back `skipped`. The only
/// `Err` a scheduler sees is a setup or store-selection failure;
/// per-record failures are contained in the report.
pub fn run_cycle_at<A, F>(
    home: &Path,
    store: &dyn OrderStore,
    connect: F,
    config: &EngineConfig,
    cache: &mut RowIndexCache,
    dry_run: bool,
) -> Result<CycleReport, EngineError>
where
    A: SheetsApi,
    F: FnOnce() -> Result<A, SheetsError>,
{
    let lock = SyncLock::new(
        home,
        SYNC_LOCK_NAME,
        Duration::from_secs(config.lock_ttl_secs),
    );
    let Some(guard) = lock.acquire()? else {
        tracing::info!("sync cycle skipped: '{SYNC_LOCK_NAME}' lock is held");
        return Ok(CycleReport::lock_held());
    };

    let api = connect().map_err(|err| {
        tracing::error!("sheets client initialization failed: {err}");
        EngineError::Sheets(err)
    })?;

    let dirty = store.list_dirty()?;
    let variants = VariantTable::from_config(config);

    let mut outcomes = Vec::with_capacity(dirty.len());
    for order in &dirty {
        let number = order.order_number.clone();
        let outcome = match push_order(&api, &variants, cache, config, order, dry_run) {
            Ok(outcome) => match clear_marker(store, order, &outcome, dry_run) {
                Ok(()) => {
                    tracing::info!("synced order {number}: {outcome:?}");
                    outcome
                }
                Err(err) => {
                    tracing::error!("marker clear failed for order {number}: {err}");
                    SyncOutcome::Failed(err.to_string())
                }
            },
            Err(err) => {
                tracing::error!("sync failed for order {number}: {err}");
                SyncOutcome::Failed(err.to_string())
            }
        };
        outcomes.push(OrderOutcome {
            order_number: number,
            outcome,
        });
    }

    guard.release()?;
    Ok(CycleReport {
        skipped: false,
        outcomes,
    })
}

/// Locate-build-upsert for one order. Errors here are record-level.
fn push_order(
    api: &dyn SheetsApi,
    variants: &VariantTable,
    cache: &mut RowIndexCache,
    config: &EngineConfig,
    order: &Order,
    dry_run: bool,
) -> Result<SyncOutcome, SheetsError> {
    let variant = variants.resolve(&order.target_sheet_id);
    let layout = variant.layout();

    let located = cache.locate(
        api,
        &order.target_sheet_id,
        &order.target_tab_name,
        layout,
        &order.order_number,
        config.scan_row_ceiling,
    )?;

    let values = build_row(order, variant);
    upsert(
        api,
        &order.target_sheet_id,
        &order.target_tab_name,
        layout,
        located,
        values,
        dry_run,
    )
}

/// A marker is cleared only after a confirmed real write.
fn clear_marker(
    store: &dyn OrderStore,
    order: &Order,
    outcome: &SyncOutcome,
    dry_run: bool,
) -> Result<(), sheetsync_core::StoreError> {
    if dry_run {
        return Ok(());
    }
    debug_assert!(matches!(
        outcome,
        SyncOutcome::Inserted | SyncOutcome::Updated
    ));
    store.clear_dirty(&order.order_number)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
