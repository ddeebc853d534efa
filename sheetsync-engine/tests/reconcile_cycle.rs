//! End-to-end reconciliation behaviour through the public crate API:
//! file-backed store, in-memory sheets, real lock files.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tempfile::TempDir;

use sheetsync_core::{
    store, EngineConfig, FileOrderStore, Order, OrderBook, OrderNumber, OrderStatus, SheetId,
    TabName,
};
use sheetsync_engine::{run_cycle_at, RowIndexCache, SyncLock, SyncOutcome, SYNC_LOCK_NAME};
use sheetsync_sheets::InMemorySheets;

fn order(number: &str) -> Order {
    let now = Utc::now();
    Order {
        order_number: OrderNumber::from(number),
        target_sheet_id: SheetId::from("sheet-a"),
        target_tab_name: TabName::from("Orders"),
        order_date: NaiveDate::from_ymd_opt(2024, 9, 10),
        client_name: "Akinyi R.".to_string(),
        client_phone: "+254766000007".to_string(),
        delivery_address: "Oginga Odinga Rd 8".to_string(),
        city: "Kisumu".to_string(),
        product: "Torch".to_string(),
        quantity: 4,
        amount: 960.0,
        status: OrderStatus::Confirmed,
        delivery_date: None,
        agent: "agent-5".to_string(),
        merchant: "acme".to_string(),
        instructions: String::new(),
        dirty_since: Some(now),
        created_at: now,
        updated_at: now,
    }
}

fn seed_store(home: &std::path::Path, orders: Vec<Order>) {
    store::save_at(home, &OrderBook { version: 1, orders }).expect("seed store");
}

#[test]
fn two_cycles_over_a_file_store_never_duplicate_rows() {
    let home = TempDir::new().expect("home");
    let sheet = SheetId::from("sheet-a");
    let fake = InMemorySheets::new();
    fake.seed_rows(
        &sheet,
        "Orders",
        vec![vec!["x1"], vec!["x2"], vec!["x3"], vec!["x4"], vec!["ORD-2"]],
    );
    seed_store(home.path(), vec![order("ORD-1"), order("ORD-2")]);

    let file_store = FileOrderStore::new(home.path());
    let config = EngineConfig::default();
    let mut cache = RowIndexCache::new();

    let report = run_cycle_at(
        home.path(),
        &file_store,
        || Ok(&fake),
        &config,
        &mut cache,
        false,
    )
    .expect("first cycle");
    assert_eq!(report.outcomes[0].outcome, SyncOutcome::Inserted);
    assert_eq!(report.outcomes[1].outcome, SyncOutcome::Updated);

    let book = store::load_at(home.path()).expect("load");
    assert!(book.orders.iter().all(|o| !o.is_dirty()), "markers cleared");
    let row_count = fake.rows(&sheet, "Orders").len();
    assert_eq!(row_count, 6);

    // Re-dirty both and run again: idempotence means updates only.
    let mut book = store::load_at(home.path()).expect("load");
    for o in &mut book.orders {
        o.dirty_since = Some(Utc::now());
    }
    store::save_at(home.path(), &book).expect("save");

    let report = run_cycle_at(
        home.path(),
        &file_store,
        || Ok(&fake),
        &config,
        &mut cache,
        false,
    )
    .expect("second cycle");
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.outcome == SyncOutcome::Updated));
    assert_eq!(fake.rows(&sheet, "Orders").len(), row_count, "no new rows");
}

#[test]
fn concurrent_runner_is_locked_out_entirely() {
    let home = TempDir::new().expect("home");
    seed_store(home.path(), vec![order("ORD-1")]);
    let fake = InMemorySheets::new();

    let lock = SyncLock::new(home.path(), SYNC_LOCK_NAME, Duration::from_secs(300));
    let held = lock.acquire().expect("acquire").expect("win");

    let file_store = FileOrderStore::new(home.path());
    let mut cache = RowIndexCache::new();
    let report = run_cycle_at(
        home.path(),
        &file_store,
        || Ok(&fake),
        &EngineConfig::default(),
        &mut cache,
        false,
    )
    .expect("cycle");

    assert!(report.skipped);
    assert_eq!(fake.call_count(), 0);
    let book = store::load_at(home.path()).expect("load");
    assert!(book.orders[0].is_dirty(), "record untouched while locked out");

    drop(held);
    let report = run_cycle_at(
        home.path(),
        &file_store,
        || Ok(&fake),
        &EngineConfig::default(),
        &mut cache,
        false,
    )
    .expect("cycle after release");
    assert!(!report.skipped);
    assert_eq!(report.synced(), 1);
}
