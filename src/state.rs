use crate::error::{Error, Result};
use crate::schema::{Column, COLUMN_COUNT};

/// Rows shown at startup and after a clear
pub const DEFAULT_ROWS: usize = 10;

pub type GridRow = [String; COLUMN_COUNT];

/// Characters that end a line of pasted text, including lone `\r` from
/// classic Mac clipboards and the Unicode line and paragraph separators
pub const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// First line of `text`, trimmed; what a single cell keeps from a paste
pub fn first_line(text: &str) -> &str {
    text.split(LINE_BREAKS).next().unwrap_or("").trim()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellPosition {
    pub row: usize,
    pub col: usize,
}

impl CellPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Human-readable reference such as `R3 Serial Number (*)`
    pub fn to_reference(&self) -> String {
        match Column::from_index(self.col) {
            Some(column) => format!("R{} {}", self.row + 1, column.label()),
            None => format!("R{} C{}", self.row + 1, self.col + 1),
        }
    }

    /// Move by a delta, clamped to a grid of `rows` rows
    pub fn offset(&self, delta_row: isize, delta_col: isize, rows: usize) -> Self {
        let max_row = rows.saturating_sub(1) as isize;
        let row = (self.row as isize + delta_row).clamp(0, max_row) as usize;
        let col = (self.col as isize + delta_col).clamp(0, COLUMN_COUNT as isize - 1) as usize;
        Self { row, col }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Edit,
}

/// The editable device grid: a growable list of fixed-width rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridState {
    rows: Vec<GridRow>,
}

impl GridState {
    pub fn new(rows: usize) -> Self {
        let mut grid = Self::default();
        grid.load(rows);
        grid
    }

    /// Reset to `rows` empty rows.
    pub fn load(&mut self, rows: usize) {
        self.rows = vec![GridRow::default(); rows];
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Every row in order, for serialization
    pub fn export_rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().flatten().all(|cell| cell.is_empty())
    }

    /// Set a cell, appending rows at the end until `row` exists.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        if col >= COLUMN_COUNT {
            return Err(Error::ColumnOutOfRange(col));
        }
        if row >= self.rows.len() {
            self.rows.resize_with(row + 1, GridRow::default);
        }
        self.rows[row][col] = value.into();
        Ok(())
    }

    /// Write the non-blank lines of `text` down column `col` starting at
    /// `anchor_row`. Returns the number of cells written.
    pub fn paste_at(&mut self, anchor_row: usize, col: usize, text: &str) -> Result<usize> {
        if col >= COLUMN_COUNT {
            return Err(Error::ColumnOutOfRange(col));
        }
        let values = text.split(LINE_BREAKS).map(str::trim).filter(|v| !v.is_empty());

        let mut written = 0;
        for (offset, value) in values.enumerate() {
            self.set_cell(anchor_row + offset, col, value)?;
            written += 1;
        }
        Ok(written)
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [GridRow] {
        &mut self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_resets_to_blank_rows() {
        let mut grid = GridState::new(DEFAULT_ROWS);
        grid.set_cell(3, 2, "C-1").unwrap();
        grid.set_cell(14, 0, "7").unwrap();
        assert_eq!(grid.row_count(), 15);

        grid.load(DEFAULT_ROWS);
        assert_eq!(grid.row_count(), DEFAULT_ROWS);
        assert!(grid.is_blank());
    }

    #[test]
    fn set_cell_appends_rows_at_the_end() {
        let mut grid = GridState::new(2);
        grid.set_cell(0, 0, "first").unwrap();
        grid.set_cell(4, 6, "SN9").unwrap();

        assert_eq!(grid.row_count(), 5);
        assert_eq!(grid.cell(0, 0), "first");
        assert_eq!(grid.cell(4, 6), "SN9");
        assert_eq!(grid.cell(3, 6), "");
    }

    #[test]
    fn set_cell_rejects_unknown_column() {
        let mut grid = GridState::new(1);
        assert!(matches!(
            grid.set_cell(0, COLUMN_COUNT, "x"),
            Err(Error::ColumnOutOfRange(8))
        ));
        assert_eq!(grid.row_count(), 1);
    }

    #[test]
    fn paste_grows_grid_and_drops_blank_lines() {
        let mut grid = GridState::new(DEFAULT_ROWS);
        let mut text = String::new();
        for i in 0..15 {
            text.push_str(&format!("  dev-{i}  \n"));
            if i % 4 == 0 {
                text.push_str("   \n\n");
            }
        }

        let written = grid.paste_at(5, 0, &text).unwrap();

        assert_eq!(written, 15);
        assert!(grid.row_count() >= 20);
        for i in 0..15 {
            assert_eq!(grid.cell(5 + i, 0), format!("dev-{i}"));
        }
        for row in 0..5 {
            assert_eq!(grid.cell(row, 0), "");
        }
    }

    #[test]
    fn paste_handles_crlf_and_leaves_other_columns() {
        let mut grid = GridState::new(3);
        grid.set_cell(0, 1, "model").unwrap();
        grid.paste_at(0, 4, "aa:bb\r\ncc:dd\r\n").unwrap();

        assert_eq!(grid.cell(0, 4), "aa:bb");
        assert_eq!(grid.cell(1, 4), "cc:dd");
        assert_eq!(grid.cell(0, 1), "model");
        assert_eq!(grid.row_count(), 3);
    }

    #[test]
    fn paste_splits_on_carriage_returns_and_unicode_breaks() {
        let mut grid = GridState::new(10);

        assert_eq!(grid.paste_at(0, 0, "7\r8\r9").unwrap(), 3);
        assert_eq!(grid.cell(0, 0), "7");
        assert_eq!(grid.cell(1, 0), "8");
        assert_eq!(grid.cell(2, 0), "9");

        assert_eq!(grid.paste_at(0, 6, "SN1\u{2028}SN2\x0cSN3\u{85}\r\n").unwrap(), 3);
        assert_eq!(grid.cell(2, 6), "SN3");
        assert_eq!(grid.cell(3, 6), "");
        assert_eq!(grid.row_count(), 10);
    }

    #[test]
    fn single_cell_paste_keeps_first_line() {
        assert_eq!(first_line(" aa:bb \rcc:dd"), "aa:bb");
        assert_eq!(first_line("SN1\u{2029}SN2"), "SN1");
        assert_eq!(first_line("7"), "7");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn export_renders_missing_cells_as_empty() {
        let mut grid = GridState::new(2);
        grid.set_cell(1, 7, "pool").unwrap();
        let rows = grid.export_rows();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].iter().all(String::is_empty));
        assert_eq!(rows[1][7], "pool");
    }

    #[test]
    fn offset_clamps_to_grid() {
        let pos = CellPosition::new(0, 0);
        assert_eq!(pos.offset(-1, -1, 10), CellPosition::new(0, 0));
        assert_eq!(pos.offset(20, 20, 10), CellPosition::new(9, COLUMN_COUNT - 1));
        assert_eq!(CellPosition::new(2, 6).to_reference(), "R3 Serial Number (*)");
    }
}
