//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_cell_formats;
use randcol_core::{
    CellAddress, CellError, CellValue, NumberFormat, SharedString, Table, MAX_ROWS,
};

/// Turn `_xHHHH_` sequences back into the characters they stand for
/// (`_x000D_` is a carriage return, `_x005F_` a literal underscore).
/// Anything that is not a complete sequence is kept as written.
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' {
            result.push(c);
            continue;
        }

        let mut hex_chars = String::new();
        let mut saw_x = false;

        if chars.peek() == Some(&'x') {
            chars.next();
            saw_x = true;

            for _ in 0..4 {
                match chars.peek() {
                    Some(&ch) if ch.is_ascii_hexdigit() => {
                        hex_chars.push(ch);
                        chars.next();
                    }
                    _ => break,
                }
            }

            if hex_chars.len() == 4 && chars.peek() == Some(&'_') {
                if let Some(decoded) =
                    u32::from_str_radix(&hex_chars, 16).ok().and_then(char::from_u32)
                {
                    chars.next();
                    result.push(decoded);
                    continue;
                }
            }
        }

        // Not an escape sequence, emit what was consumed
        result.push('_');
        if saw_x {
            result.push('x');
            result.push_str(&hex_chars);
        }
    }

    result
}

/// Cell being assembled between `<c>` and `</c>`
#[derive(Default)]
struct PendingCell {
    address: Option<CellAddress>,
    cell_type: Option<String>,
    value: Option<String>,
    /// Index into the stylesheet's `cellXfs`
    style: u32,
    has_formula: bool,
}

/// Cells of one worksheet, plus the style index of every styled value
struct SheetData {
    grid: Vec<Vec<CellValue>>,
    styled: Vec<(u32, u16, u32)>,
}

/// Parts of `workbook.xml.rels` the reader follows
#[derive(Default)]
struct WorkbookRels {
    sheets: HashMap<String, String>,
    styles: Option<String>,
}

/// The first worksheet of a workbook
#[derive(Debug, Clone, PartialEq)]
pub struct XlsxDocument {
    pub table: Table,
    /// Names of the other sheets, in workbook order; they are not read
    pub other_sheets: Vec<String>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read the first worksheet of a file into a table
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Table> {
        Ok(Self::read_document_file(path)?.table)
    }

    /// Read the first worksheet from a reader into a table
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Table> {
        Ok(Self::read_document(reader)?.table)
    }

    /// Read the first worksheet of a file, noting which sheets were left out
    pub fn read_document_file<P: AsRef<Path>>(path: P) -> XlsxResult<XlsxDocument> {
        let file = File::open(path)?;
        Self::read_document(file)
    }

    /// Read the first worksheet from a reader, noting which sheets were left
    /// out.
    ///
    /// Number formats of data cells are resolved through `styles.xml` and
    /// attached to the table. The header row is the first non-empty row.
    pub fn read_document<R: Read + Seek>(reader: R) -> XlsxResult<XlsxDocument> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let rels = Self::read_workbook_rels(&mut archive)?;
        let cell_formats = Self::read_styles(&mut archive, rels.styles.as_deref())?;

        let (name, path) = sheet_info
            .iter()
            .find_map(|(name, r_id)| rels.sheets.get(r_id).map(|path| (name, path)))
            .ok_or_else(|| XlsxError::InvalidFormat("workbook has no worksheets".into()))?;

        let other_sheets: Vec<String> = sheet_info
            .iter()
            .map(|(sheet, _)| sheet)
            .filter(|sheet| *sheet != name)
            .cloned()
            .collect();
        if !other_sheets.is_empty() {
            log::warn!(
                "workbook has {} sheets, only '{}' is read and written back; dropping {:?}",
                sheet_info.len(),
                name,
                other_sheets
            );
        }

        let sheet = Self::read_worksheet(&mut archive, path, &shared_strings)?;
        let mut table = Table::from_grid(name.as_str(), sheet.grid);

        let first_data_row = table.header_row() + 1;
        for (row, col, style) in sheet.styled {
            let format = match cell_formats.get(style as usize) {
                Some(format) if !format.is_general() => format.clone(),
                _ => continue,
            };
            if let Some(data_row) = (row as usize).checked_sub(first_data_row) {
                table.set_number_format(data_row, usize::from(col), format)?;
            }
        }

        Ok(XlsxDocument {
            table,
            other_sheets,
        })
    }

    /// Cell formats from the stylesheet; a workbook without one has none
    fn read_styles<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: Option<&str>,
    ) -> XlsxResult<Vec<NumberFormat>> {
        match archive.by_name(path.unwrap_or("xl/styles.xml")) {
            Ok(file) => read_cell_formats(file),
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<SharedString>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        // Leading/trailing spaces in text are significant (column names)
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(SharedString::new(""));
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(SharedString::new(decode_excel_escapes(&current_string)));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current_string.push_str(&e.unescape()?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds, in workbook order
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"sheet" =>
                {
                    let mut name = None;
                    let mut r_id = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"id" => {
                                r_id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get worksheet part paths by rId and the
    /// stylesheet path
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<WorkbookRels> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = WorkbookRels::default();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value().ok().map(|s| s.to_string());
                        match attr.key.as_ref() {
                            b"Id" => id = value,
                            b"Target" => target = value,
                            b"Type" => rel_type = value,
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        // Target is relative to xl/ unless absolute
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("xl/{}", target),
                        };
                        if rel_type.ends_with("/worksheet") {
                            rels.sheets.insert(id, full_path);
                        } else if rel_type.ends_with("/styles") {
                            rels.styles = Some(full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet part into a dense row-major grid
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        shared_strings: &[SharedString],
    ) -> XlsxResult<SheetData> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut grid: Vec<Vec<CellValue>> = Vec::new();
        let mut styled = Vec::new();

        // Rows and cells may omit their `r` attribute; positions then follow
        // document order.
        let mut next_row: u32 = 0;
        let mut current_row: u32 = 0;
        let mut next_col: u16 = 0;

        let mut cell = PendingCell::default();
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        current_row = Self::row_number(&e)?.unwrap_or(next_row);
                        next_col = 0;
                    }
                    b"c" => {
                        in_cell = true;
                        cell = Self::parse_cell_attrs(&e)?;
                    }
                    b"v" if in_cell => in_value = true,
                    b"f" if in_cell => cell.has_formula = true,
                    b"is" if in_cell => {
                        in_inline_str = true;
                        cell.cell_type = Some("inlineStr".to_string());
                    }
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        current_row = Self::row_number(&e)?.unwrap_or(next_row);
                        next_row = current_row + 1;
                    }
                    b"c" => {
                        // Style-only cell
                        let empty = Self::parse_cell_attrs(&e)?;
                        let col = empty.address.map_or(next_col, |a| a.col);
                        next_col = col.saturating_add(1);
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"row" => next_row = current_row + 1,
                    b"c" => {
                        let (row, col) = match cell.address {
                            Some(addr) => (addr.row, addr.col),
                            None => (current_row, next_col),
                        };
                        let value = Self::cell_value(&cell, shared_strings)?;
                        if cell.style != 0 && !value.is_empty() {
                            styled.push((row, col, cell.style));
                        }
                        Self::place(&mut grid, row, col, value);
                        next_col = col.saturating_add(1);
                        in_cell = false;
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_value || in_inline_text {
                        let text = e.unescape()?;
                        cell.value.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(SheetData { grid, styled })
    }

    fn row_number(e: &BytesStart) -> XlsxResult<Option<u32>> {
        for attr in e.attributes().flatten() {
            if attr.key.as_ref() == b"r" {
                let raw = attr.unescape_value()?;
                let r: u32 = raw
                    .parse()
                    .map_err(|_| XlsxError::Parse(format!("Invalid row number: {}", raw)))?;
                if r == 0 || r > MAX_ROWS {
                    return Err(XlsxError::Parse(format!("Row number out of range: {}", r)));
                }
                return Ok(Some(r - 1));
            }
        }
        Ok(None)
    }

    fn parse_cell_attrs(e: &BytesStart) -> XlsxResult<PendingCell> {
        let mut cell = PendingCell::default();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    let raw = attr.unescape_value()?;
                    let addr = CellAddress::parse(&raw).map_err(|err| {
                        XlsxError::Parse(format!("Invalid cell reference '{}': {}", raw, err))
                    })?;
                    cell.address = Some(addr);
                }
                b"t" => {
                    cell.cell_type = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"s" => {
                    cell.style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(0);
                }
                _ => {}
            }
        }
        Ok(cell)
    }

    /// Convert the raw `<v>`/`<is>` text of a cell into a value.
    ///
    /// Formula cells yield their cached result.
    fn cell_value(cell: &PendingCell, shared_strings: &[SharedString]) -> XlsxResult<CellValue> {
        let value = match cell.value.as_deref() {
            Some(v) => v,
            None => {
                if cell.has_formula {
                    log::debug!("formula cell without cached value read as empty");
                }
                return Ok(CellValue::Empty);
            }
        };

        let cell_value = match cell.cell_type.as_deref() {
            // Shared string
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }

            Some("b") => CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true")),

            Some("e") => CellError::parse(value)
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::string(value)),

            Some("inlineStr") | Some("str") => CellValue::string(decode_excel_escapes(value)),

            // Number (default type or explicit "n"); ISO dates ("d") stay text
            None | Some("n") => match value.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::string(value),
            },

            Some(_) => CellValue::string(value),
        };

        Ok(cell_value)
    }

    fn place(grid: &mut Vec<Vec<CellValue>>, row: u32, col: u16, value: CellValue) {
        let (row, col) = (row as usize, col as usize);
        if grid.len() <= row {
            grid.resize_with(row + 1, Vec::new);
        }
        let cells = &mut grid[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }
}
