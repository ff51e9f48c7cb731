mod parse;
mod serialize;

pub use parse::parse;
pub use serialize::serialize;

/// Parsed delimited-text content: rows of text cells, in file order.
///
/// Rows may be ragged; a short row is treated as having missing trailing
/// cells. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Maximum cell count across all rows. Every column-indexed structure is
    /// sized to this, so short rows read as missing trailing cells.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn column_count_is_widest_row() {
        let table = RawTable::new(vec![row(&["a"]), row(&["a", "b", "c"]), row(&[])]);
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn column_count_of_empty_table_is_zero() {
        assert_eq!(RawTable::new(Vec::new()).column_count(), 0);
    }

    #[test]
    fn cell_lookup_tolerates_short_rows() {
        let table = RawTable::new(vec![row(&["a", "b"]), row(&["c"])]);
        assert_eq!(table.cell(0, 1), Some("b"));
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.cell(9, 0), None);
    }
}
