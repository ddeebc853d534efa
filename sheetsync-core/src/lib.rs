//! Sheetsync core library — domain types, order store, configuration, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and the [`Order`](types::Order) domain struct
//! - [`store`] — the dirty-record store boundary and its file adapter
//! - [`config`] — [`EngineConfig`](config::EngineConfig) load/save
//! - [`error`] — [`StoreError`]

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::EngineConfig;
pub use error::StoreError;
pub use store::{FileOrderStore, OrderStore};
pub use types::{Order, OrderBook, OrderNumber, OrderStatus, SheetId, TabName};
