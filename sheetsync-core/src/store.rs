//! Dirty-record store boundary and its file-backed adapter.
//!
//! # Storage layout
//!
//! ```text
//! ~/.sheetsync/
//!   orders.yaml    (order book — mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function touching disk has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.
//!
//! The order CRUD side owns record creation and mutation; the sync engine
//! only reads the dirty set and clears markers. [`OrderStore`] is that seam.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::StoreError;
use crate::types::{Order, OrderBook, OrderNumber};

/// The dirty-record store as the sync engine sees it.
///
/// `list_dirty` returns every order whose marker is set; `clear_dirty`
/// clears the marker for exactly one order and leaves every other field
/// untouched (aside from the `updated_at` audit stamp).
pub trait OrderStore {
    fn list_dirty(&self) -> Result<Vec<Order>, StoreError>;
    fn clear_dirty(&self, order_number: &OrderNumber) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.sheetsync/` — creates the directory (mode `0700`) if absent.
pub fn sheetsync_dir_at(home: &Path) -> Result<PathBuf, StoreError> {
    let dir = home.join(".sheetsync");
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

/// `<home>/.sheetsync/orders.yaml` — pure, no I/O.
pub fn order_book_path_at(home: &Path) -> PathBuf {
    home.join(".sheetsync").join("orders.yaml")
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load the order book. Returns an empty book if the file does not exist.
pub fn load_at(home: &Path) -> Result<OrderBook, StoreError> {
    let path = order_book_path_at(home);
    if !path.exists() {
        return Ok(OrderBook {
            version: 1,
            orders: vec![],
        });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<OrderBook, StoreError> {
    load_at(&home()?)
}

/// Atomically save the order book.
///
/// Write flow: serialize → `orders.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// The `.tmp` lives in the same directory as the target (same filesystem).
pub fn save_at(home: &Path, book: &OrderBook) -> Result<(), StoreError> {
    sheetsync_dir_at(home)?;
    let path = order_book_path_at(home);
    let tmp = path.with_file_name("orders.yaml.tmp");

    let yaml = serde_yaml::to_string(book)?;
    std::fs::write(&tmp, yaml)?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(book: &OrderBook) -> Result<(), StoreError> {
    save_at(&home()?, book)
}

/// Insert or replace one order by order number and save.
///
/// This is the write half the owning CRUD side uses; the replacement keeps
/// `created_at` from the existing record when present.
pub fn upsert_order_at(home: &Path, mut order: Order) -> Result<(), StoreError> {
    let mut book = load_at(home)?;
    match book
        .orders
        .iter_mut()
        .find(|o| o.order_number == order.order_number)
    {
        Some(existing) => {
            order.created_at = existing.created_at;
            *existing = order;
        }
        None => book.orders.push(order),
    }
    save_at(home, &book)
}

// ---------------------------------------------------------------------------
// File adapter
// ---------------------------------------------------------------------------

/// [`OrderStore`] over the YAML order book at `<home>/.sheetsync/orders.yaml`.
#[derive(Debug, Clone)]
pub struct FileOrderStore {
    home: PathBuf,
}

impl FileOrderStore {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }
}

impl OrderStore for FileOrderStore {
    fn list_dirty(&self) -> Result<Vec<Order>, StoreError> {
        let book = load_at(&self.home)?;
        Ok(book.orders.into_iter().filter(Order::is_dirty).collect())
    }

    fn clear_dirty(&self, order_number: &OrderNumber) -> Result<(), StoreError> {
        let mut book = load_at(&self.home)?;
        let order = book
            .orders
            .iter_mut()
            .find(|o| &o.order_number == order_number)
            .ok_or_else(|| StoreError::UnknownOrder(order_number.clone()))?;
        order.dirty_since = None;
        order.updated_at = Utc::now();
        save_at(&self.home, &book)
    }
}

// ---------------------------------------------------------------------------
// Permissions / home
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, StoreError> {
    dirs::home_dir().ok_or(StoreError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
