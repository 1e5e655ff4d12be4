//! XLSX writer

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use crate::error::XlsxResult;
use crate::styles::StyleTable;
use randcol_core::{CellAddress, CellError, CellValue, Table};

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a table to a file path
    pub fn write_file<P: AsRef<Path>>(table: &Table, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(table, file)
    }

    /// Write a table as a single-sheet workbook
    pub fn write<W: Write + Seek>(table: &Table, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let styles = StyleTable::build(table);

        Self::write_content_types(&mut zip)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, table)?;
        Self::write_workbook_rels(&mut zip)?;

        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(styles.to_styles_xml().as_bytes())?;

        Self::write_worksheet(&mut zip, table, &styles)?;

        zip.finish()?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        table: &Table,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="{}" sheetId="1" r:id="rId1"/>
    </sheets>
</workbook>"#,
            escape_xml(table.sheet_name())
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        table: &Table,
        styles: &StyleTable,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/worksheets/sheet1.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>"#,
        );

        // Index 0 is the header, data row `i` comes at `i + 1`
        let rows = std::iter::once(table.headers()).chain(table.rows().iter().map(Vec::as_slice));
        for (idx, cells) in rows.enumerate() {
            if cells.iter().all(CellValue::is_empty) {
                continue;
            }

            let sheet_row = table.header_row() + idx;
            content.push_str(&format!("\n        <row r=\"{}\">", sheet_row + 1));
            for (col_idx, value) in cells.iter().enumerate() {
                let cell_ref = CellAddress::new(sheet_row as u32, col_idx as u16).to_a1_string();
                let style = match idx.checked_sub(1) {
                    Some(data_row) => styles.xf_id_for(table, data_row, col_idx),
                    None => 0,
                };
                Self::write_cell(&mut content, &cell_ref, style, value);
            }
            content.push_str("\n        </row>");
        }

        content.push_str("\n    </sheetData>\n</worksheet>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_cell(content: &mut String, cell_ref: &str, style: u32, value: &CellValue) {
        let attrs = if style == 0 {
            format!("r=\"{}\"", cell_ref)
        } else {
            format!("r=\"{}\" s=\"{}\"", cell_ref, style)
        };

        match value {
            CellValue::Number(n) if n.is_finite() => {
                content.push_str(&format!("\n            <c {}><v>{}</v></c>", attrs, n));
            }
            CellValue::Number(_) => {
                // Excel has no representation for NaN or infinity
                content.push_str(&format!(
                    "\n            <c {} t=\"e\"><v>{}</v></c>",
                    attrs,
                    CellError::Num.as_str()
                ));
            }
            CellValue::String(s) => {
                let text = s.as_str();
                let space = if text.trim() != text {
                    " xml:space=\"preserve\""
                } else {
                    ""
                };
                content.push_str(&format!(
                    "\n            <c {} t=\"inlineStr\"><is><t{}>{}</t></is></c>",
                    attrs,
                    space,
                    escape_xml(&encode_excel_escapes(text))
                ));
            }
            CellValue::Boolean(b) => {
                content.push_str(&format!(
                    "\n            <c {} t=\"b\"><v>{}</v></c>",
                    attrs,
                    if *b { 1 } else { 0 }
                ));
            }
            CellValue::Error(e) => {
                content.push_str(&format!(
                    "\n            <c {} t=\"e\"><v>{}</v></c>",
                    attrs,
                    escape_xml(e.as_str())
                ));
            }
            CellValue::Empty => {}
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Encode characters XML cannot carry verbatim as `_xHHHH_`.
///
/// Control characters (other than tab and line feed) and carriage returns are
/// encoded; an underscore that would otherwise read as the start of an escape
/// is itself escaped as `_x005F_`.
fn encode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for (idx, c) in s.char_indices() {
        match c {
            '_' if looks_like_escape(&s[idx..]) => result.push_str("_x005F_"),
            '\t' | '\n' => result.push(c),
            c if (c as u32) < 0x20 => result.push_str(&format!("_x{:04X}_", c as u32)),
            c => result.push(c),
        }
    }

    result
}

fn looks_like_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 7
        && bytes[1] == b'x'
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::decode_excel_escapes;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_encode_excel_escapes() {
        assert_eq!(encode_excel_escapes("a\rb"), "a_x000D_b");
        assert_eq!(encode_excel_escapes("tab\there"), "tab\there");
        assert_eq!(encode_excel_escapes("_x000D_"), "_x005F_x000D_");
        assert_eq!(encode_excel_escapes("snake_case"), "snake_case");
    }

    #[test]
    fn test_escapes_survive_decoding() {
        for text in ["a\r\nb", "_x0041_ literal", "plain", "bell\u{7}"] {
            assert_eq!(decode_excel_escapes(&encode_excel_escapes(text)), text);
        }
    }
}
