//! Header-plus-rows table model

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::number_format::NumberFormat;
use crate::value::CellValue;

/// A rectangular table read from the first worksheet of a file.
///
/// The first non-empty row of the sheet is the header; every following row
/// is data. All rows are kept at the same width as the header, padded with
/// [`CellValue::Empty`]. Header cells are stored as values so that writing a
/// table back reproduces them exactly.
///
/// Data cells may carry a [`NumberFormat`]. Cells in a date format are never
/// treated as numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    sheet_name: String,
    /// Blank sheet rows above the header
    header_row: usize,
    headers: Vec<CellValue>,
    rows: Vec<Vec<CellValue>>,
    number_formats: BTreeMap<(usize, usize), NumberFormat>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new("Sheet1")
    }
}

impl Table {
    /// Create an empty table for the given sheet
    pub fn new<S: Into<String>>(sheet_name: S) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            header_row: 0,
            headers: Vec::new(),
            rows: Vec::new(),
            number_formats: BTreeMap::new(),
        }
    }

    /// Create a table on "Sheet1" with the given header row
    pub fn with_headers<I, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let mut table = Self::default();
        table.headers = headers.into_iter().map(Into::into).collect();
        table
    }

    /// Build a table from a dense grid of sheet rows.
    ///
    /// Leading rows that are entirely empty are skipped and counted in
    /// [`Table::header_row`]; the first remaining row is the header.
    /// Trailing empty rows are dropped; rows are padded to the widest row.
    pub fn from_grid<S: Into<String>>(sheet_name: S, mut grid: Vec<Vec<CellValue>>) -> Self {
        while grid.last().is_some_and(|row| is_blank(row)) {
            grid.pop();
        }

        let mut table = Self::new(sheet_name);
        table.header_row = grid.iter().take_while(|row| is_blank(row)).count();

        let mut rows = grid.into_iter().skip(table.header_row);
        if let Some(header) = rows.next() {
            table.headers = header;
        }
        for row in rows {
            table.push_row(row);
        }
        table.pad_to(table.width());
        table
    }

    /// Sheet name the table was read from (and will be written to)
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Zero-based sheet row holding the header
    pub fn header_row(&self) -> usize {
        self.header_row
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of data rows (the header is not counted)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Raw header cells
    pub fn headers(&self) -> &[CellValue] {
        &self.headers
    }

    /// Display name of a column.
    ///
    /// Blank headers get a positional placeholder (`Unnamed: 3`) so every
    /// column has a printable name.
    pub fn column_name(&self, col: usize) -> Option<String> {
        let header = self.headers.get(col)?;
        let text = header.to_string();
        if text.trim().is_empty() {
            Some(format!("Unnamed: {}", col))
        } else {
            Some(text)
        }
    }

    /// Display names of all columns, in order
    pub fn column_names(&self) -> Vec<String> {
        (0..self.column_count())
            .filter_map(|col| self.column_name(col))
            .collect()
    }

    /// Append a data row, widening the table if the row is longer than the
    /// header
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        let width = self.width().max(row.len());
        row.resize(width, CellValue::Empty);
        self.rows.push(row);
        self.pad_to(width);
    }

    /// Data rows
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Get a data cell (0-based data row, 0-based column)
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Replace a data cell
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) -> Result<()> {
        let out_of_bounds = Error::CellOutOfBounds {
            row,
            col,
            rows: self.rows.len(),
            columns: self.headers.len(),
        };
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(out_of_bounds),
        }
    }

    /// Iterate over the data cells of one column, top to bottom
    pub fn column(&self, col: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(col))
    }

    /// Number format of a data cell, if it has one other than General
    pub fn number_format(&self, row: usize, col: usize) -> Option<&NumberFormat> {
        self.number_formats.get(&(row, col))
    }

    /// Attach a number format to a data cell; General clears it
    pub fn set_number_format(
        &mut self,
        row: usize,
        col: usize,
        format: NumberFormat,
    ) -> Result<()> {
        if row >= self.rows.len() || col >= self.headers.len() {
            return Err(Error::CellOutOfBounds {
                row,
                col,
                rows: self.rows.len(),
                columns: self.headers.len(),
            });
        }
        if format.is_general() {
            self.number_formats.remove(&(row, col));
        } else {
            self.number_formats.insert((row, col), format);
        }
        Ok(())
    }

    /// Formatted data cells as `((row, col), format)`, row by row
    pub fn number_formats(&self) -> impl Iterator<Item = ((usize, usize), &NumberFormat)> + '_ {
        self.number_formats.iter().map(|(&cell, format)| (cell, format))
    }

    /// Whether a data cell is shown as a date or time
    pub fn is_date(&self, row: usize, col: usize) -> bool {
        self.number_format(row, col)
            .is_some_and(NumberFormat::is_date_format)
    }

    /// Numeric reading of a data cell.
    ///
    /// Same as [`CellValue::as_numeric`], except that date and time cells
    /// are not numbers.
    pub fn numeric(&self, row: usize, col: usize) -> Option<f64> {
        if self.is_date(row, col) {
            return None;
        }
        self.get(row, col).and_then(CellValue::as_numeric)
    }

    fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(self.headers.len())
    }

    fn pad_to(&mut self, width: usize) {
        self.headers.resize(width, CellValue::Empty);
        for row in &mut self.rows {
            row.resize(width, CellValue::Empty);
        }
    }
}

fn is_blank(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_grid_splits_header_and_pads() {
        let grid = vec![
            vec![CellValue::string("a"), CellValue::string("b")],
            vec![CellValue::Number(1.0)],
            vec![
                CellValue::Number(2.0),
                CellValue::Number(3.0),
                CellValue::string("extra"),
            ],
            vec![CellValue::Empty, CellValue::Empty],
        ];
        let table = Table::from_grid("Data", grid);

        assert_eq!(table.sheet_name(), "Data");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.get(0, 1), Some(&CellValue::Empty));
        assert_eq!(table.get(1, 2), Some(&CellValue::string("extra")));
        assert_eq!(table.column_names(), vec!["a", "b", "Unnamed: 2"]);
    }

    #[test]
    fn test_numeric_header_name() {
        let table = Table::with_headers(vec![CellValue::Number(2024.0), CellValue::Empty]);
        assert_eq!(table.column_names(), vec!["2024", "Unnamed: 1"]);
    }

    #[test]
    fn test_set_and_column() {
        let mut table = Table::with_headers(["x", "y"]);
        table.push_row(vec![1.0.into(), 2.0.into()]);
        table.push_row(vec![3.0.into(), "n/a".into()]);

        table.set(1, 1, CellValue::Number(4.0)).unwrap();
        let ys: Vec<_> = table.column(1).cloned().collect();
        assert_eq!(ys, vec![CellValue::Number(2.0), CellValue::Number(4.0)]);

        assert!(table.set(2, 0, CellValue::Empty).is_err());
        assert!(table.set(0, 2, CellValue::Empty).is_err());
    }

    #[test]
    fn test_from_grid_skips_leading_blank_rows() {
        let grid = vec![
            vec![],
            vec![CellValue::Empty, CellValue::Empty],
            vec![CellValue::string("Деталь"), CellValue::string("МЗ 1/60")],
            vec![CellValue::string("A"), CellValue::Number(21.0)],
        ];
        let table = Table::from_grid("Протокол", grid);

        assert_eq!(table.header_row(), 2);
        assert_eq!(table.column_names(), vec!["Деталь", "МЗ 1/60"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get(0, 1), Some(&CellValue::Number(21.0)));
    }

    #[test]
    fn test_from_grid_all_blank() {
        let table = Table::from_grid("Sheet1", vec![vec![CellValue::Empty]; 3]);
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.header_row(), 0);
    }

    #[test]
    fn test_date_cells_are_not_numeric() {
        let mut table = Table::with_headers(["Дата", "МЗ 1/60"]);
        table.push_row(vec![45123.0.into(), 21.0.into()]);

        table
            .set_number_format(0, 0, NumberFormat::Custom("dd.mm.yyyy".into()))
            .unwrap();
        table.set_number_format(0, 1, NumberFormat::BuiltIn(2)).unwrap();

        assert!(table.is_date(0, 0));
        assert_eq!(table.numeric(0, 0), None);
        assert_eq!(table.numeric(0, 1), Some(21.0));
        assert_eq!(table.number_formats().count(), 2);

        table.set_number_format(0, 1, NumberFormat::General).unwrap();
        assert_eq!(table.number_format(0, 1), None);
        assert!(table
            .set_number_format(1, 0, NumberFormat::BuiltIn(14))
            .is_err());
    }
}
