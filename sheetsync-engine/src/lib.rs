//! # sheetsync-engine
//!
//! The reconciliation engine: a lock-guarded [`run_cycle_at`] pass that
//! pushes every dirty order into its target sheet via locate-then-upsert,
//! isolating per-record failures and clearing markers only on confirmed
//! success.

pub mod cycle;
pub mod error;
pub mod lock;
pub mod locator;
pub mod upsert;

pub use cycle::{run_cycle_at, CycleReport, OrderOutcome, SYNC_LOCK_NAME};
pub use error::EngineError;
pub use lock::{LockGuard, SyncLock};
pub use locator::{locate_row, RowIndexCache};
pub use upsert::{upsert, SyncOutcome};
