//! A1-notation range construction.
//!
//! The remote API addresses everything through range strings built from a
//! tab name, column letters, and row numbers. These helpers are the single
//! place those strings are assembled.

use sheetsync_core::TabName;

use crate::schema::ColumnLayout;

/// Key-column scan range: rows 1 through `ceiling` of the key column only,
/// e.g. `Orders!A1:A10000`.
pub fn key_scan_range(tab: &TabName, layout: &ColumnLayout, ceiling: u32) -> String {
    format!(
        "{}!{key}1:{key}{ceiling}",
        quote_tab(tab),
        key = layout.key_column,
    )
}

/// A single key cell at a known row, e.g. `Orders!A41`.
pub fn key_cell_range(tab: &TabName, layout: &ColumnLayout, row: u32) -> String {
    format!("{}!{key}{row}", quote_tab(tab), key = layout.key_column)
}

/// Full column window at one row, e.g. `Orders!A5:N5` — the target of an
/// update-in-place.
pub fn row_range(tab: &TabName, layout: &ColumnLayout, row: u32) -> String {
    format!(
        "{}!{first}{row}:{last}{row}",
        quote_tab(tab),
        first = layout.first_column,
        last = layout.last_column,
    )
}

/// Full column window starting at row 1, e.g. `Orders!A1:N1` — the append
/// target; the API locates the first empty row below it.
pub fn append_range(tab: &TabName, layout: &ColumnLayout) -> String {
    format!(
        "{}!{first}1:{last}1",
        quote_tab(tab),
        first = layout.first_column,
        last = layout.last_column,
    )
}

/// Quote a tab name when it contains anything beyond `[A-Za-z0-9_]`.
/// Embedded single quotes are doubled, per A1 notation.
fn quote_tab(tab: &TabName) -> String {
    let plain = tab
        .0
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        tab.0.clone()
    } else {
        format!("'{}'", tab.0.replace('\'', "''"))
    }
}
