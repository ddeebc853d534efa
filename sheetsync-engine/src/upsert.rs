//! Insert-append vs update-in-place.

use sheetsync_core::{SheetId, TabName};
use sheetsync_sheets::range::{append_range, row_range};
use sheetsync_sheets::{ColumnLayout, SheetsApi, SheetsError};

/// Outcome of pushing one order to its sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new row was appended.
    Inserted,
    /// An existing row was overwritten in place.
    Updated,
    /// Dry-run: a row *would* have been appended.
    WouldInsert,
    /// Dry-run: the row at this position *would* have been overwritten.
    WouldUpdate,
    /// The record's push failed and its dirty marker was left set.
    Failed(String),
}

impl SyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed(_))
    }
}

/// Write one built row to its located position.
///
/// Absent → append over the layout window (the API finds the first empty
/// row); present → positional overwrite of the whole window at that row.
/// Both writes are raw-value; the remote side never interprets the cells.
///
/// Idempotence of the engine hangs on this split: a retry after a
/// successful insert re-locates the now-present row and lands here as an
/// update, never as a second append.
pub fn upsert(
    api: &dyn SheetsApi,
    sheet: &SheetId,
    tab: &TabName,
    layout: &ColumnLayout,
    located_row: Option<u32>,
    values: Vec<String>,
    dry_run: bool,
) -> Result<SyncOutcome, SheetsError> {
    match located_row {
        None => {
            if dry_run {
                return Ok(SyncOutcome::WouldInsert);
            }
            api.append(sheet, &append_range(tab, layout), &[values])?;
            Ok(SyncOutcome::Inserted)
        }
        Some(row) => {
            if dry_run {
                return Ok(SyncOutcome::WouldUpdate);
            }
            api.update(sheet, &row_range(tab, layout, row), &[values])?;
            Ok(SyncOutcome::Updated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsync_sheets::schema::{FULFILMENT_LAYOUT, STANDARD_LAYOUT};
    use sheetsync_sheets::InMemorySheets;

    fn sheet() -> SheetId {
        SheetId::from("sheet-1")
    }

    fn tab() -> TabName {
        TabName::from("Orders")
    }

    fn row_of(n: usize, prefix: &str) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn absent_row_appends() {
        let fake = InMemorySheets::new();
        let outcome = upsert(
            &fake,
            &sheet(),
            &tab(),
            &STANDARD_LAYOUT,
            None,
            row_of(14, "a"),
            false,
        )
        .expect("upsert");
        assert_eq!(outcome, SyncOutcome::Inserted);
        assert_eq!(fake.rows(&sheet(), "Orders").len(), 1);
    }

    #[test]
    fn present_row_updates_in_place() {
        let fake = InMemorySheets::new();
        fake.seed_rows(
            &sheet(),
            "Orders",
            vec![vec!["one"], vec!["two"], vec!["three"]],
        );

        let outcome = upsert(
            &fake,
            &sheet(),
            &tab(),
            &STANDARD_LAYOUT,
            Some(2),
            row_of(14, "n"),
            false,
        )
        .expect("upsert");
        assert_eq!(outcome, SyncOutcome::Updated);

        let rows = fake.rows(&sheet(), "Orders");
        assert_eq!(rows.len(), 3, "update must not add rows");
        assert_eq!(rows[1][0], "n0");
        assert_eq!(rows[0][0], "one", "neighbouring rows untouched");
        assert_eq!(rows[2][0], "three");
    }

    #[test]
    fn fulfilment_append_leaves_partner_column_alone() {
        let fake = InMemorySheets::new();
        let outcome = upsert(
            &fake,
            &sheet(),
            &tab(),
            &FULFILMENT_LAYOUT,
            None,
            row_of(15, "f"),
            false,
        )
        .expect("upsert");
        assert_eq!(outcome, SyncOutcome::Inserted);

        let rows = fake.rows(&sheet(), "Orders");
        assert_eq!(rows[0][0], "", "column A is partner-owned");
        assert_eq!(rows[0][1], "f0", "window starts at B");
    }

    #[test]
    fn dry_run_writes_nothing() {
        let fake = InMemorySheets::new();
        let insert = upsert(
            &fake,
            &sheet(),
            &tab(),
            &STANDARD_LAYOUT,
            None,
            row_of(14, "a"),
            true,
        )
        .expect("upsert");
        let update = upsert(
            &fake,
            &sheet(),
            &tab(),
            &STANDARD_LAYOUT,
            Some(1),
            row_of(14, "a"),
            true,
        )
        .expect("upsert");

        assert_eq!(insert, SyncOutcome::WouldInsert);
        assert_eq!(update, SyncOutcome::WouldUpdate);
        assert_eq!(fake.call_count(), 0, "dry-run must not touch the API");
    }
}
