//! Row location by business key.
//!
//! The remote API has no secondary index, so lookup is a bounded linear
//! scan of the key column. First match wins: duplicate keys are an
//! upstream data-quality condition this engine does not repair, and taking
//! the first occurrence keeps the operation deterministic.

use std::collections::HashMap;

use sheetsync_core::{OrderNumber, SheetId, TabName};
use sheetsync_sheets::range::{key_cell_range, key_scan_range};
use sheetsync_sheets::{ColumnLayout, SheetsApi, SheetsError};

/// Find the 1-based row holding `order_number` in the layout's key column,
/// scanning rows 1 through `ceiling`. Cell values are compared after
/// whitespace trimming. `None` when absent or the column is empty.
pub fn locate_row(
    api: &dyn SheetsApi,
    sheet: &SheetId,
    tab: &TabName,
    layout: &ColumnLayout,
    order_number: &OrderNumber,
    ceiling: u32,
) -> Result<Option<u32>, SheetsError> {
    let range = key_scan_range(tab, layout, ceiling);
    let column = api.get(sheet, &range)?;

    for (index, row) in column.iter().enumerate() {
        let cell = row.first().map(String::as_str).unwrap_or("");
        if cell.trim() == order_number.0 {
            return Ok(Some(index as u32 + 1));
        }
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Row-index cache
// ---------------------------------------------------------------------------

/// Cache of known `(sheet, tab, order) -> row` positions across cycles.
///
/// Purely a scan-avoidance layer: a hit is re-verified by reading the
/// single key cell at the cached row before it is trusted, and any
/// mismatch falls back to a full scan. A wrong entry can therefore cost an
/// extra read but never cause a duplicate insert.
#[derive(Debug, Default)]
pub struct RowIndexCache {
    rows: HashMap<(SheetId, TabName, OrderNumber), u32>,
}

impl RowIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Locate via the cache when possible, falling back to a full scan.
    pub fn locate(
        &mut self,
        api: &dyn SheetsApi,
        sheet: &SheetId,
        tab: &TabName,
        layout: &ColumnLayout,
        order_number: &OrderNumber,
        ceiling: u32,
    ) -> Result<Option<u32>, SheetsError> {
        let key = (sheet.clone(), tab.clone(), order_number.clone());

        if let Some(&row) = self.rows.get(&key) {
            if self.verify(api, sheet, tab, layout, order_number, row)? {
                return Ok(Some(row));
            }
            // Sheet shifted under us (manual edit, row insertion); the
            // stale entry must not short-circuit the real scan.
            self.rows.remove(&key);
        }

        let located = locate_row(api, sheet, tab, layout, order_number, ceiling)?;
        if let Some(row) = located {
            self.rows.insert(key, row);
        }
        Ok(located)
    }

    /// Record a row we just established (e.g. right after an append).
    pub fn insert(
        &mut self,
        sheet: &SheetId,
        tab: &TabName,
        order_number: &OrderNumber,
        row: u32,
    ) {
        self.rows
            .insert((sheet.clone(), tab.clone(), order_number.clone()), row);
    }

    fn verify(
        &self,
        api: &dyn SheetsApi,
        sheet: &SheetId,
        tab: &TabName,
        layout: &ColumnLayout,
        order_number: &OrderNumber,
        row: u32,
    ) -> Result<bool, SheetsError> {
        let range = key_cell_range(tab, layout, row);
        let cells = api.get(sheet, &range)?;
        let value = cells
            .first()
            .and_then(|row| row.first())
            .map(String::as_str)
            .unwrap_or("");
        Ok(value.trim() == order_number.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsync_sheets::schema::STANDARD_LAYOUT;
    use sheetsync_sheets::InMemorySheets;

    fn sheet() -> SheetId {
        SheetId::from("sheet-1")
    }

    fn tab() -> TabName {
        TabName::from("Orders")
    }

    #[test]
    fn finds_first_match_after_trim() {
        let fake = InMemorySheets::new();
        fake.seed_rows(&sheet(), "Orders", vec![vec!["123"], vec![" 456 "], vec!["789"]]);

        let row = locate_row(
            &fake,
            &sheet(),
            &tab(),
            &STANDARD_LAYOUT,
            &OrderNumber::from("456"),
            10_000,
        )
        .expect("locate");
        assert_eq!(row, Some(2));
    }

    #[test]
    fn absent_key_returns_none() {
        let fake = InMemorySheets::new();
        fake.seed_rows(&sheet(), "Orders", vec![vec!["123"], vec!["456"]]);

        let row = locate_row(
            &fake,
            &sheet(),
            &tab(),
            &STANDARD_LAYOUT,
            &OrderNumber::from("999"),
            10_000,
        )
        .expect("locate");
        assert_eq!(row, None);
    }

    #[test]
    fn empty_tab_returns_none() {
        let fake = InMemorySheets::new();
        let row = locate_row(
            &fake,
            &sheet(),
            &tab(),
            &STANDARD_LAYOUT,
            &OrderNumber::from("123"),
            10_000,
        )
        .expect("locate");
        assert_eq!(row, None);
    }

    #[test]
    fn duplicate_keys_resolve_to_the_first_row() {
        let fake = InMemorySheets::new();
        fake.seed_rows(&sheet(), "Orders", vec![vec!["dup"], vec!["dup"]]);

        let row = locate_row(
            &fake,
            &sheet(),
            &tab(),
            &STANDARD_LAYOUT,
            &OrderNumber::from("dup"),
            10_000,
        )
        .expect("locate");
        assert_eq!(row, Some(1));
    }

    #[test]
    fn cache_hit_is_verified_with_a_single_cell_read() {
        let fake = InMemorySheets::new();
        fake.seed_rows(&sheet(), "Orders", vec![vec!["ORD-1"], vec!["ORD-2"]]);

        let mut cache = RowIndexCache::new();
        let first = cache
            .locate(&fake, &sheet(), &tab(), &STANDARD_LAYOUT, &OrderNumber::from("ORD-2"), 10_000)
            .expect("locate");
        assert_eq!(first, Some(2));
        let calls_after_scan = fake.call_count();

        let second = cache
            .locate(&fake, &sheet(), &tab(), &STANDARD_LAYOUT, &OrderNumber::from("ORD-2"), 10_000)
            .expect("locate");
        assert_eq!(second, Some(2));
        assert_eq!(
            fake.call_count(),
            calls_after_scan + 1,
            "a verified hit costs exactly one key-cell read"
        );
    }

    #[test]
    fn stale_cache_entry_falls_back_to_full_scan() {
        let fake = InMemorySheets::new();
        fake.seed_rows(&sheet(), "Orders", vec![vec!["ORD-1"], vec!["ORD-2"]]);

        let mut cache = RowIndexCache::new();
        cache.insert(&sheet(), &tab(), &OrderNumber::from("ORD-2"), 1);

        let row = cache
            .locate(&fake, &sheet(), &tab(), &STANDARD_LAYOUT, &OrderNumber::from("ORD-2"), 10_000)
            .expect("locate");
        assert_eq!(row, Some(2), "mismatched entry must be re-resolved by scan");
    }

    #[test]
    fn stale_entry_for_a_vanished_row_reports_absent() {
        let fake = InMemorySheets::new();
        fake.seed_rows(&sheet(), "Orders", vec![vec!["ORD-1"]]);

        let mut cache = RowIndexCache::new();
        cache.insert(&sheet(), &tab(), &OrderNumber::from("ORD-9"), 7);

        let row = cache
            .locate(&fake, &sheet(), &tab(), &STANDARD_LAYOUT, &OrderNumber::from("ORD-9"), 10_000)
            .expect("locate");
        assert_eq!(row, None, "absence must win over a stale cache entry");
    }
}
