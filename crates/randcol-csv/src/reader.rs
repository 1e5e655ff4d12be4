//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{CsvLayout, CsvReadOptions, LineTerminator};
use randcol_core::{CellValue, Table};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a table; the first non-blank record is the header
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Table> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a table
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Table> {
        Ok(Self::read_with_layout(reader, options)?.0)
    }

    /// Read a CSV file, also returning how its records were laid out
    pub fn read_file_with_layout<P: AsRef<Path>>(
        path: P,
        options: &CsvReadOptions,
    ) -> CsvResult<(Table, CsvLayout)> {
        let file = File::open(path)?;
        Self::read_with_layout(file, options)
    }

    /// Read CSV into a table, also returning how its records were laid out.
    ///
    /// Blank leading records are skipped; the first record with a value is
    /// the header.
    pub fn read_with_layout<R: Read>(
        mut reader: R,
        options: &CsvReadOptions,
    ) -> CsvResult<(Table, CsvLayout)> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_slice());

        let mut layout = CsvLayout::default();
        let mut grid = Vec::new();
        let mut seen_header = false;
        let mut record = csv::StringRecord::new();

        while csv_reader.read_record(&mut record)? {
            if layout.line_terminator.is_none() {
                let end = csv_reader.position().byte() as usize;
                layout.line_terminator = terminator_at(&data, end);
            }
            layout.record_widths.push(record.len());

            let detect = options.auto_detect_types && seen_header;
            let row: Vec<CellValue> = record
                .iter()
                .map(|field| {
                    if detect {
                        Self::detect_type(field)
                    } else {
                        Self::text(field)
                    }
                })
                .collect();
            seen_header |= row.iter().any(|cell| !cell.is_empty());
            grid.push(row);
        }

        Ok((Table::from_grid("Sheet1", grid), layout))
    }

    fn text(field: &str) -> CellValue {
        if field.is_empty() {
            CellValue::Empty
        } else {
            CellValue::string(field)
        }
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return Self::text(field);
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(false);
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::string(field),
        }
    }
}

/// Terminator of the record that ends at byte `end`.
///
/// The parser stops right after a `\r`, or after a lone `\n`.
fn terminator_at(data: &[u8], end: usize) -> Option<LineTerminator> {
    let last = end.checked_sub(1).and_then(|idx| data.get(idx))?;
    match (last, data.get(end)) {
        (b'\r', Some(b'\n')) => Some(LineTerminator::CRLF),
        (b'\n', _) if end >= 2 && data[end - 2] == b'\r' => Some(LineTerminator::CRLF),
        (b'\n', _) => Some(LineTerminator::LF),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_keeps_text_by_default() {
        let data = "Деталь;МЗ 1/60\nP-1;21.50\nP-2;\n";
        let options = CsvReadOptions {
            delimiter: b';',
            ..Default::default()
        };

        let table = CsvReader::read(data.as_bytes(), &options).unwrap();

        assert_eq!(table.column_names(), vec!["Деталь", "МЗ 1/60"]);
        assert_eq!(table.get(0, 1), Some(&CellValue::string("21.50")));
        assert_eq!(table.get(1, 1), Some(&CellValue::Empty));
    }

    #[test]
    fn test_read_detects_types_when_asked() {
        let data = "a,b,c\n1.5,TRUE,x\n";
        let options = CsvReadOptions {
            auto_detect_types: true,
            ..Default::default()
        };

        let table = CsvReader::read(data.as_bytes(), &options).unwrap();

        assert_eq!(table.get(0, 0), Some(&CellValue::Number(1.5)));
        assert_eq!(table.get(0, 1), Some(&CellValue::Boolean(true)));
        assert_eq!(table.get(0, 2), Some(&CellValue::string("x")));
    }

    #[test]
    fn test_read_ragged_rows() {
        let data = "a,b\n1\n1,2,3\n";
        let table = CsvReader::read(data.as_bytes(), &CsvReadOptions::default()).unwrap();

        assert_eq!(table.column_count(), 3);
        assert_eq!(table.get(0, 1), Some(&CellValue::Empty));
        assert_eq!(table.get(1, 2), Some(&CellValue::string("3")));
    }

    #[test]
    fn test_layout_records_terminator_and_widths() {
        let options = CsvReadOptions::default();

        let data = "a,b\n1\n1,2,3\n";
        let (_, layout) = CsvReader::read_with_layout(data.as_bytes(), &options).unwrap();
        assert_eq!(layout.line_terminator, Some(LineTerminator::LF));
        assert_eq!(layout.record_widths, vec![2, 1, 3]);

        let data = "\"multi\nline\",b\r\n1,2\r\n";
        let (_, layout) = CsvReader::read_with_layout(data.as_bytes(), &options).unwrap();
        assert_eq!(layout.line_terminator, Some(LineTerminator::CRLF));
    }

    #[test]
    fn test_layout_without_terminator() {
        let options = CsvReadOptions::default();
        let (table, layout) = CsvReader::read_with_layout("only,header".as_bytes(), &options).unwrap();

        assert_eq!(table.column_names(), vec!["only", "header"]);
        assert_eq!(layout.line_terminator, None);
        assert_eq!(layout.record_widths, vec![2]);
    }

    #[test]
    fn test_blank_leading_records_are_not_the_header() {
        let data = ",,\nДеталь,МЗ 1/60\nP-1,21.5\n";
        let options = CsvReadOptions {
            auto_detect_types: true,
            ..Default::default()
        };

        let table = CsvReader::read(data.as_bytes(), &options).unwrap();

        assert_eq!(table.header_row(), 1);
        assert_eq!(table.column_names(), vec!["Деталь", "МЗ 1/60"]);
        assert_eq!(table.get(0, 1), Some(&CellValue::Number(21.5)));
    }
}
