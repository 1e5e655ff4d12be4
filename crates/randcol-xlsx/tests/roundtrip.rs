//! End-to-end tests for XLSX roundtrip (build table -> write -> read -> verify)

use pretty_assertions::assert_eq;
use randcol_core::{CellError, CellValue, NumberFormat, Table};
use randcol_xlsx::{XlsxReader, XlsxWriter};
use std::io::Cursor;

fn roundtrip(table: &Table) -> Table {
    let mut buf = Vec::new();
    XlsxWriter::write(table, Cursor::new(&mut buf)).unwrap();
    XlsxReader::read(Cursor::new(&buf)).unwrap()
}

/// Test that every value kind survives a write/read cycle
#[test]
fn test_roundtrip_mixed_values() {
    let mut table = Table::with_headers(["Деталь", "МЗ 1/60", "OK", "Note"]);
    table.push_row(vec![
        "P-1".into(),
        21.123456789012_f64.into(),
        true.into(),
        CellValue::Empty,
    ]);
    table.push_row(vec![
        "P-2".into(),
        "не измерено".into(),
        false.into(),
        CellValue::Error(CellError::Div0),
    ]);
    table.push_row(vec![
        "P-3".into(),
        1e-7.into(),
        CellValue::Empty,
        "Special: <>&\"'".into(),
    ]);

    let read = roundtrip(&table);

    assert_eq!(read, table);
}

/// Header whitespace and line breaks must come back byte-for-byte
#[test]
fn test_roundtrip_preserves_whitespace_and_control_chars() {
    let mut table = Table::with_headers([" МЗ  1/60 ", "Multi\r\nLine", "_x000D_"]);
    table.push_row(vec![1.0.into(), "  padded  ".into(), "tab\tsep".into()]);

    let read = roundtrip(&table);

    assert_eq!(read.column_names(), vec![" МЗ  1/60 ", "Multi\r\nLine", "_x000D_"]);
    assert_eq!(read.get(0, 1), Some(&CellValue::string("  padded  ")));
    assert_eq!(read.get(0, 2), Some(&CellValue::string("tab\tsep")));
}

/// Empty rows in the middle of the data keep their position
#[test]
fn test_roundtrip_interior_empty_rows() {
    let mut table = Table::with_headers(["a", "b"]);
    table.push_row(vec![1.0.into(), 2.0.into()]);
    table.push_row(vec![CellValue::Empty, CellValue::Empty]);
    table.push_row(vec![3.0.into(), 4.0.into()]);

    let read = roundtrip(&table);

    assert_eq!(read.row_count(), 3);
    assert_eq!(read.get(2, 1), Some(&CellValue::Number(4.0)));
}

/// Sheet names are kept, including characters that need XML escaping
#[test]
fn test_roundtrip_sheet_name() {
    let table = Table::from_grid("Q&A <1>", vec![vec!["x".into()], vec![1.0.into()]]);

    assert_eq!(roundtrip(&table).sheet_name(), "Q&A <1>");
}

/// Date and number formats come back on the same cells
#[test]
fn test_roundtrip_number_formats() {
    let mut table = Table::with_headers(["Дата", "МЗ 1/60", "Время"]);
    table.push_row(vec![45123.0.into(), 21.25.into(), 0.5.into()]);
    table.push_row(vec![45124.0.into(), 21.75.into(), CellValue::Empty]);
    table.set_number_format(0, 0, NumberFormat::BuiltIn(14)).unwrap();
    table.set_number_format(1, 0, NumberFormat::Custom("dd.mm.yyyy".into())).unwrap();
    table.set_number_format(0, 1, NumberFormat::BuiltIn(2)).unwrap();
    table.set_number_format(0, 2, NumberFormat::Custom("[h]:mm".into())).unwrap();

    let read = roundtrip(&table);

    assert_eq!(read, table);
    assert!(read.is_date(0, 0) && read.is_date(1, 0) && read.is_date(0, 2));
    assert!(!read.is_date(0, 1));
}

/// Blank rows above the header survive a rewrite
#[test]
fn test_roundtrip_header_offset() {
    let grid = vec![
        vec![],
        vec![CellValue::Empty],
        vec!["Деталь".into(), "МЗ 1/60".into()],
        vec!["P-1".into(), 21.0.into()],
    ];
    let table = Table::from_grid("Протокол", grid);
    assert_eq!(table.header_row(), 2);

    let read = roundtrip(&table);

    assert_eq!(read, table);
    assert_eq!(read.header_row(), 2);
}

/// Writing to disk and reading back from the path
#[test]
fn test_roundtrip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("protocol.xlsx");

    let mut table = Table::with_headers(["МЗ 2/40"]);
    table.push_row(vec![21.9.into()]);
    XlsxWriter::write_file(&table, &path).unwrap();

    let read = XlsxReader::read_file(&path).unwrap();
    assert_eq!(read.get(0, 0).and_then(CellValue::as_number), Some(21.9));
}
