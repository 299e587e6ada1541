//! Replacement table: rows of string cells parsed from delimited text.

use crate::domain::value_objects::CellDelimiter;

/// Rows beyond this count are ignored by generation and validation.
pub const MAX_ROWS: usize = 100_000;

/// Ordered rows of ordered cells, built once per run.
///
/// Cells are not trimmed and there is no quoting: `"a,b"` is two cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowTable {
    rows: Vec<Vec<String>>,
}

impl RowTable {
    /// Parse `text` into rows.
    ///
    /// Lines end at `\r\n`, `\n` or `\r`; blank lines are skipped.
    pub fn parse(text: &str, delimiter: CellDelimiter) -> Self {
        let rows = text
            .split(['\n', '\r'])
            .filter(|line| !line.trim().is_empty())
            .map(|line| delimiter.split(line))
            .collect();
        Self { rows }
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Raw row count, including rows past [`MAX_ROWS`].
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows the engine will actually process.
    pub fn effective_len(&self) -> usize {
        self.rows.len().min(MAX_ROWS)
    }

    pub fn exceeds_max_rows(&self) -> bool {
        self.rows.len() > MAX_ROWS
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Rows `start..end`, with `end` clamped to the effective length.
    pub fn rows_in_range(&self, start: usize, end: usize) -> &[Vec<String>] {
        let end = end.min(self.effective_len());
        let start = start.min(end);
        &self.rows[start..end]
    }

    pub fn first_row_width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn max_row_width(&self) -> usize {
        self.rows[..self.effective_len()]
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    pub fn has_variable_row_length(&self) -> bool {
        self.first_row_width() != self.max_row_width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_line_endings_and_skips_blank_lines() {
        let table = RowTable::parse("a,b\r\n\r\nc;d\re,f\n   \n", CellDelimiter::Any);
        assert_eq!(table.len(), 3);
        assert_eq!(table.row(0), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(table.row(1), Some(&["c".to_string(), "d".to_string()][..]));
        assert_eq!(table.row(2), Some(&["e".to_string(), "f".to_string()][..]));
    }

    #[test]
    fn respects_configured_delimiter() {
        let table = RowTable::parse("a,b;c", CellDelimiter::Semicolon);
        assert_eq!(table.row(0).map(<[String]>::len), Some(2));
        assert_eq!(table.row(0).map(|r| r[0].as_str()), Some("a,b"));
    }

    #[test]
    fn cells_are_not_trimmed() {
        let table = RowTable::parse(" apple , 8", CellDelimiter::Comma);
        assert_eq!(table.row(0).map(|r| r[0].as_str()), Some(" apple "));
    }

    #[test]
    fn trailing_empty_cells_are_dropped() {
        let table = RowTable::parse("a,b,\na,,b", CellDelimiter::Comma);
        assert_eq!(table.row(0).map(<[String]>::len), Some(2));
        assert_eq!(table.row(1).map(<[String]>::len), Some(3));
    }

    #[test]
    fn empty_text_has_no_rows() {
        let table = RowTable::parse("\n\n", CellDelimiter::Any);
        assert!(table.is_empty());
        assert_eq!(table.first_row_width(), 0);
        assert_eq!(table.max_row_width(), 0);
        assert!(!table.has_variable_row_length());
    }

    #[test]
    fn detects_variable_row_length() {
        let uniform = RowTable::parse("a,b\nc,d", CellDelimiter::Any);
        assert!(!uniform.has_variable_row_length());

        let ragged = RowTable::parse("a,b\nc,d,e", CellDelimiter::Any);
        assert_eq!(ragged.first_row_width(), 2);
        assert_eq!(ragged.max_row_width(), 3);
        assert!(ragged.has_variable_row_length());
    }

    #[test]
    fn range_is_clamped() {
        let table = RowTable::parse("1\n2\n3", CellDelimiter::Any);
        assert_eq!(table.rows_in_range(1, 10).len(), 2);
        assert!(table.rows_in_range(5, 10).is_empty());
    }

    #[test]
    fn caps_effective_length() {
        let rows = vec![vec!["x".to_string()]; MAX_ROWS + 1];
        let table = RowTable::from_rows(rows);
        assert_eq!(table.len(), MAX_ROWS + 1);
        assert_eq!(table.effective_len(), MAX_ROWS);
        assert!(table.exceeds_max_rows());
    }
}
