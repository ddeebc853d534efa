//! Column-layout variants and the sheet-identity routing table.
//!
//! Layouts are a closed set: adding a sheet family with a new column order
//! is a new [`SchemaVariant`] case plus a [`VariantTable`] entry, not a
//! string comparison threaded through the engine.

use sheetsync_core::{EngineConfig, SheetId};

/// The closed set of known column layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    /// Default layout used by every sheet without a dedicated entry.
    Standard,
    /// The fulfilment partner's layout: key in column B and split
    /// delivered/scheduled date columns.
    Fulfilment,
}

impl SchemaVariant {
    /// The immutable column geometry of this variant.
    pub fn layout(self) -> &'static ColumnLayout {
        match self {
            SchemaVariant::Standard => &STANDARD_LAYOUT,
            SchemaVariant::Fulfilment => &FULFILMENT_LAYOUT,
        }
    }
}

/// Column geometry of one layout: where the key lives and the inclusive
/// column window every read and write spans.
///
/// Columns are single letters; no layout is anywhere near the 26-column
/// ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub key_column: char,
    pub first_column: char,
    pub last_column: char,
}

impl ColumnLayout {
    /// Number of cells in one row of this layout.
    pub fn width(&self) -> usize {
        (self.last_column as u8 - self.first_column as u8 + 1) as usize
    }

    /// Zero-based position of the key column inside the window.
    pub fn key_offset(&self) -> usize {
        (self.key_column as u8 - self.first_column as u8) as usize
    }
}

/// Window `A..N`, key in `A`, one unconditional delivery-date column.
pub static STANDARD_LAYOUT: ColumnLayout = ColumnLayout {
    key_column: 'A',
    first_column: 'A',
    last_column: 'N',
};

/// Window `B..P` (column A is partner-owned), key in `B`, split
/// delivered-on / scheduled-for date columns.
pub static FULFILMENT_LAYOUT: ColumnLayout = ColumnLayout {
    key_column: 'B',
    first_column: 'B',
    last_column: 'P',
};

/// Maps a target-sheet identity to its layout variant.
///
/// Resolution is a pure function of the sheet id: the one configured
/// fulfilment identity routes to [`SchemaVariant::Fulfilment`]; every other
/// identity — including ones never seen before — routes to
/// [`SchemaVariant::Standard`]. There is no error case.
#[derive(Debug, Clone, Default)]
pub struct VariantTable {
    fulfilment_sheet: Option<SheetId>,
}

impl VariantTable {
    pub fn new(fulfilment_sheet: Option<SheetId>) -> Self {
        Self { fulfilment_sheet }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.fulfilment_sheet())
    }

    pub fn resolve(&self, sheet_id: &SheetId) -> SchemaVariant {
        match &self.fulfilment_sheet {
            Some(special) if special == sheet_id => SchemaVariant::Fulfilment,
            _ => SchemaVariant::Standard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_identity_routes_to_fulfilment() {
        let table = VariantTable::new(Some(SheetId::from("special-sheet")));
        assert_eq!(
            table.resolve(&SheetId::from("special-sheet")),
            SchemaVariant::Fulfilment
        );
    }

    #[test]
    fn any_other_identity_routes_to_standard() {
        let table = VariantTable::new(Some(SheetId::from("special-sheet")));
        assert_eq!(
            table.resolve(&SheetId::from("never-seen-before")),
            SchemaVariant::Standard
        );
    }

    #[test]
    fn unconfigured_table_routes_everything_to_standard() {
        let table = VariantTable::default();
        assert_eq!(
            table.resolve(&SheetId::from("special-sheet")),
            SchemaVariant::Standard
        );
    }

    #[test]
    fn layout_geometry() {
        let standard = SchemaVariant::Standard.layout();
        assert_eq!(standard.width(), 14);
        assert_eq!(standard.key_offset(), 0);

        let fulfilment = SchemaVariant::Fulfilment.layout();
        assert_eq!(fulfilment.width(), 15);
        assert_eq!(fulfilment.key_offset(), 0);
        assert_eq!(fulfilment.key_column, 'B');
    }
}
