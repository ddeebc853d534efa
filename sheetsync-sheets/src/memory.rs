//! In-memory [`SheetsApi`] double for tests and offline development.
//!
//! Stores each tab as a dense grid addressed from column `A`, parses the
//! same A1 ranges the REST client would send, counts every call, and can
//! inject write failures for per-record isolation tests.

use std::collections::HashMap;
use std::sync::Mutex;

use sheetsync_core::SheetId;

use crate::client::SheetsApi;
use crate::error::SheetsError;

#[derive(Default)]
struct Inner {
    /// (sheet id, tab name) → row-major grid, columns from `A`.
    tabs: HashMap<(String, String), Vec<Vec<String>>>,
    calls: usize,
    fail_writes_containing: Option<String>,
    fail_everything: bool,
}

/// Thread-safe fake spreadsheet backend.
#[derive(Default)]
pub struct InMemorySheets {
    inner: Mutex<Inner>,
}

impl InMemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a tab with absolute rows (column `A` first).
    pub fn seed_rows(&self, sheet: &SheetId, tab: &str, rows: Vec<Vec<&str>>) {
        let mut inner = self.inner.lock().expect("sheets mutex");
        let grid = rows
            .into_iter()
            .map(|row| row.into_iter().map(str::to_owned).collect())
            .collect();
        inner.tabs.insert((sheet.0.clone(), tab.to_string()), grid);
    }

    /// Snapshot of a tab's grid.
    pub fn rows(&self, sheet: &SheetId, tab: &str) -> Vec<Vec<String>> {
        let inner = self.inner.lock().expect("sheets mutex");
        inner
            .tabs
            .get(&(sheet.0.clone(), tab.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of API calls served so far.
    pub fn call_count(&self) -> usize {
        self.inner.lock().expect("sheets mutex").calls
    }

    /// Fail any append/update whose row data contains this exact cell value.
    pub fn fail_writes_containing(&self, cell: &str) {
        self.inner.lock().expect("sheets mutex").fail_writes_containing = Some(cell.to_string());
    }

    /// Fail every operation, reads included.
    pub fn fail_everything(&self) {
        self.inner.lock().expect("sheets mutex").fail_everything = true;
    }
}

impl SheetsApi for InMemorySheets {
    fn get(&self, sheet: &SheetId, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let mut inner = self.inner.lock().expect("sheets mutex");
        inner.calls += 1;
        if inner.fail_everything {
            return Err(SheetsError::Injected("get".to_string()));
        }

        let parsed = parse_range(range)?;
        let Some(grid) = inner.tabs.get(&(sheet.0.clone(), parsed.tab.clone())) else {
            return Ok(vec![]);
        };

        let mut out = Vec::new();
        for row_index in parsed.first_row..=parsed.last_row {
            let Some(row) = grid.get(row_index as usize - 1) else {
                break;
            };
            out.push(window(row, parsed.first_col, parsed.last_col));
        }
        // The real API omits trailing all-empty rows.
        while out.last().is_some_and(|row| row.iter().all(|cell| cell.is_empty())) {
            out.pop();
        }
        Ok(out)
    }

    fn append(&self, sheet: &SheetId, range: &str, rows: &[Vec<String>]) -> Result<(), SheetsError> {
        let mut inner = self.inner.lock().expect("sheets mutex");
        inner.calls += 1;
        check_write(&inner, rows)?;

        let parsed = parse_range(range)?;
        let lead = col_index(parsed.first_col);
        let grid = inner
            .tabs
            .entry((sheet.0.clone(), parsed.tab.clone()))
            .or_default();
        for row in rows {
            let mut absolute = vec![String::new(); lead];
            absolute.extend(row.iter().cloned());
            grid.push(absolute);
        }
        Ok(())
    }

    fn update(&self, sheet: &SheetId, range: &str, rows: &[Vec<String>]) -> Result<(), SheetsError> {
        let mut inner = self.inner.lock().expect("sheets mutex");
        inner.calls += 1;
        check_write(&inner, rows)?;

        let parsed = parse_range(range)?;
        let lead = col_index(parsed.first_col);
        let grid = inner
            .tabs
            .entry((sheet.0.clone(), parsed.tab.clone()))
            .or_default();
        for (offset, row) in rows.iter().enumerate() {
            let target = parsed.first_row as usize - 1 + offset;
            while grid.len() <= target {
                grid.push(vec![]);
            }
            let stored = &mut grid[target];
            if stored.len() < lead + row.len() {
                stored.resize(lead + row.len(), String::new());
            }
            for (i, cell) in row.iter().enumerate() {
                stored[lead + i] = cell.clone();
            }
        }
        Ok(())
    }
}

fn check_write(inner: &Inner, rows: &[Vec<String>]) -> Result<(), SheetsError> {
    if inner.fail_everything {
        return Err(SheetsError::Injected("write".to_string()));
    }
    if let Some(marker) = &inner.fail_writes_containing {
        if rows.iter().any(|row| row.iter().any(|cell| cell == marker)) {
            return Err(SheetsError::Injected(format!("write containing '{marker}'")));
        }
    }
    Ok(())
}

fn window(row: &[String], first: char, last: char) -> Vec<String> {
    let start = col_index(first);
    let end = col_index(last) + 1;
    (start..end)
        .map(|i| row.get(i).cloned().unwrap_or_default())
        .collect()
}

fn col_index(col: char) -> usize {
    (col as u8 - b'A') as usize
}

#[derive(Debug, PartialEq)]
struct ParsedRange {
    tab: String,
    first_col: char,
    first_row: u32,
    last_col: char,
    last_row: u32,
}

/// Parse the subset of A1 notation the engine emits:
/// `Tab!A1:N5`, `'Quoted Tab'!B1:B10000`, and single cells `Tab!A41`.
fn parse_range(range: &str) -> Result<ParsedRange, SheetsError> {
    let bad = || SheetsError::Injected(format!("unparseable range '{range}'"));

    let (tab, cells) = if let Some(rest) = range.strip_prefix('\'') {
        let end = rest.find('\'').ok_or_else(bad)?;
        let tab = rest[..end].replace("''", "'");
        let after = rest[end + 1..].strip_prefix('!').ok_or_else(bad)?;
        (tab, after)
    } else {
        let bang = range.find('!').ok_or_else(bad)?;
        (range[..bang].to_string(), &range[bang + 1..])
    };

    let (first, last) = match cells.split_once(':') {
        Some((a, b)) => (a, b),
        None => (cells, cells),
    };
    let (first_col, first_row) = parse_cell(first).ok_or_else(bad)?;
    let (last_col, last_row) = parse_cell(last).ok_or_else(bad)?;

    Ok(ParsedRange {
        tab,
        first_col,
        first_row,
        last_col,
        last_row,
    })
}

fn parse_cell(cell: &str) -> Option<(char, u32)> {
    let mut chars = cell.chars();
    let col = chars.next().filter(char::is_ascii_uppercase)?;
    let row: u32 = chars.as_str().parse().ok()?;
    Some((col, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> SheetId {
        SheetId::from("sheet-1")
    }

    #[test]
    fn parse_plain_and_quoted_ranges() {
        assert_eq!(
            parse_range("Orders!A1:A10000").expect("parse"),
            ParsedRange {
                tab: "Orders".to_string(),
                first_col: 'A',
                first_row: 1,
                last_col: 'A',
                last_row: 10_000,
            }
        );
        let quoted = parse_range("'July Orders'!B5:P5").expect("parse");
        assert_eq!(quoted.tab, "July Orders");
        assert_eq!(quoted.first_col, 'B');
        assert_eq!(quoted.last_row, 5);
    }

    #[test]
    fn parse_single_cell_range() {
        let cell = parse_range("Orders!A41").expect("parse");
        assert_eq!((cell.first_col, cell.first_row), ('A', 41));
        assert_eq!((cell.last_col, cell.last_row), ('A', 41));
    }

    #[test]
    fn get_windows_columns_and_stops_at_grid_end() {
        let fake = InMemorySheets::new();
        fake.seed_rows(
            &sheet(),
            "Orders",
            vec![vec!["ORD-1", "x", "y"], vec!["ORD-2", "p", "q"]],
        );

        let got = fake.get(&sheet(), "Orders!B1:C10000").expect("get");
        assert_eq!(
            got,
            vec![
                vec!["x".to_string(), "y".to_string()],
                vec!["p".to_string(), "q".to_string()],
            ]
        );
    }

    #[test]
    fn append_pads_leading_columns() {
        let fake = InMemorySheets::new();
        fake.append(
            &sheet(),
            "Orders!B1:C1",
            &[vec!["k".to_string(), "v".to_string()]],
        )
        .expect("append");

        let rows = fake.rows(&sheet(), "Orders");
        assert_eq!(rows, vec![vec!["".to_string(), "k".to_string(), "v".to_string()]]);
    }

    #[test]
    fn update_overwrites_only_the_window() {
        let fake = InMemorySheets::new();
        fake.seed_rows(&sheet(), "Orders", vec![vec!["keep", "old", "old"]]);
        fake.update(
            &sheet(),
            "Orders!B1:C1",
            &[vec!["new".to_string(), "new".to_string()]],
        )
        .expect("update");

        let rows = fake.rows(&sheet(), "Orders");
        assert_eq!(rows[0], vec!["keep", "new", "new"]);
    }

    #[test]
    fn injected_write_failure_only_hits_matching_rows() {
        let fake = InMemorySheets::new();
        fake.fail_writes_containing("ORD-2");

        fake.append(&sheet(), "Orders!A1:B1", &[vec!["ORD-1".to_string()]])
            .expect("unmatched row writes fine");
        let err = fake
            .append(&sheet(), "Orders!A1:B1", &[vec!["ORD-2".to_string()]])
            .expect_err("matching row must fail");
        assert!(matches!(err, SheetsError::Injected(_)));
    }

    #[test]
    fn every_operation_counts_calls() {
        let fake = InMemorySheets::new();
        let _ = fake.get(&sheet(), "Orders!A1:A10");
        let _ = fake.append(&sheet(), "Orders!A1:B1", &[vec!["x".to_string()]]);
        let _ = fake.update(&sheet(), "Orders!A1:B1", &[vec!["y".to_string()]]);
        assert_eq!(fake.call_count(), 3);
    }
}
