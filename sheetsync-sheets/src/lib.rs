//! # sheetsync-sheets
//!
//! The external spreadsheet boundary: the [`SheetsApi`] trait with its REST
//! and in-memory implementations, A1 range construction, the closed set of
//! column-layout variants, and the order → row transformation.

pub mod client;
pub mod error;
pub mod memory;
pub mod range;
pub mod row;
pub mod schema;

pub use client::{RestSheetsClient, SheetsApi};
pub use error::SheetsError;
pub use memory::InMemorySheets;
pub use row::build_row;
pub use schema::{ColumnLayout, SchemaVariant, VariantTable};
