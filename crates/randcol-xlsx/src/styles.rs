//! Number formats in `xl/styles.xml`
//!
//! Only the number format of each cell style is read and written back.
//! Fonts, fills and borders fall back to the workbook defaults.

use std::collections::{BTreeMap, HashMap};
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use randcol_core::{NumberFormat, Table};

/// Number format of every `cellXfs` entry, indexed by the cells' `s`
/// attribute
pub(crate) fn read_cell_formats<R: Read>(reader: R) -> XlsxResult<Vec<NumberFormat>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut custom_codes: HashMap<u32, String> = HashMap::new();
    let mut xf_format_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"numFmt" => {
                    let id = attr_value(&e, b"numFmtId").and_then(|s| s.parse().ok());
                    let code = attr_value(&e, b"formatCode");
                    if let (Some(id), Some(code)) = (id, code) {
                        custom_codes.insert(id, code);
                    }
                }
                b"xf" if in_cell_xfs => {
                    let id = attr_value(&e, b"numFmtId")
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(0);
                    xf_format_ids.push(id);
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(xf_format_ids
        .into_iter()
        .map(|id| NumberFormat::from_id(id, custom_codes.get(&id).map(String::as_str)))
        .collect())
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.to_string()))
}

/// Cell styles needed to write a table, one per distinct number format.
///
/// Style 0 is the default; the others follow in table order.
#[derive(Debug, Default)]
pub(crate) struct StyleTable {
    xf_ids: BTreeMap<NumberFormat, u32>,
    formats: Vec<NumberFormat>,
}

impl StyleTable {
    pub(crate) fn build(table: &Table) -> Self {
        let mut styles = Self::default();
        for (_, format) in table.number_formats() {
            if !styles.xf_ids.contains_key(format) {
                styles.formats.push(format.clone());
                styles
                    .xf_ids
                    .insert(format.clone(), styles.formats.len() as u32);
            }
        }
        styles
    }

    /// Value of the `s` attribute for a data cell
    pub(crate) fn xf_id_for(&self, table: &Table, row: usize, col: usize) -> u32 {
        table
            .number_format(row, col)
            .and_then(|format| self.xf_ids.get(format).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut custom = Vec::new();
        let mut xfs = String::from(
            "\n    <xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"/>",
        );

        for format in &self.formats {
            let id = match format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => {
                    let id = NumberFormat::FIRST_CUSTOM_ID + custom.len() as u32;
                    custom.push((id, code.as_str()));
                    id
                }
            };
            xfs.push_str(&format!(
                "\n    <xf numFmtId=\"{}\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\" applyNumberFormat=\"1\"/>",
                id
            ));
        }

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !custom.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", custom.len()));
            for (id, code) in &custom {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml_attr(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        xml.push_str(
            r#"
  <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
  <fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
  <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
        );
        xml.push_str(&format!(
            "\n  <cellXfs count=\"{}\">{}\n  </cellXfs>",
            self.formats.len() + 1,
            xfs
        ));
        xml.push_str(
            r#"
  <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#,
        );
        xml
    }
}

fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
