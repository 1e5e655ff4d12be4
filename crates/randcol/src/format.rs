//! Codec selection by file extension

use std::io::{Seek, Write};
use std::path::Path;

use crate::error::{RandomizerError, Result};
use randcol_core::Table;
use randcol_csv::{CsvLayout, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
use randcol_xlsx::{XlsxReader, XlsxWriter};

/// Spreadsheet formats the randomizer reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Xlsx,
    Csv,
}

impl FileFormat {
    /// Pick the format from a path's extension (case-insensitive)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") => Some(FileFormat::Xlsx),
            Some("csv") => Some(FileFormat::Csv),
            _ => None,
        }
    }
}

/// A table read from disk, with what its codec needs to write it back
/// unchanged outside the table
#[derive(Debug, Clone)]
pub struct Document {
    pub table: Table,
    pub format: FileFormat,
    /// Sheets after the first, which are not carried over
    pub other_sheets: Vec<String>,
    csv_layout: CsvLayout,
}

impl Document {
    /// Read the file at `path` with the codec its extension selects
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)
            .ok_or_else(|| RandomizerError::UnsupportedFormat(path.to_path_buf()))?;

        match format {
            FileFormat::Xlsx => {
                let document = XlsxReader::read_document_file(path)?;
                Ok(Self {
                    table: document.table,
                    format,
                    other_sheets: document.other_sheets,
                    csv_layout: CsvLayout::default(),
                })
            }
            FileFormat::Csv => {
                let (table, csv_layout) =
                    CsvReader::read_file_with_layout(path, &CsvReadOptions::default())?;
                Ok(Self {
                    table,
                    format,
                    other_sheets: Vec::new(),
                    csv_layout,
                })
            }
        }
    }

    /// Serialize the table in the format it was read from
    pub fn write<W: Write + Seek>(&self, writer: W) -> Result<()> {
        match self.format {
            FileFormat::Xlsx => XlsxWriter::write(&self.table, writer)?,
            FileFormat::Csv => CsvWriter::write_with_layout(
                &self.table,
                writer,
                &CsvWriteOptions::default(),
                &self.csv_layout,
            )?,
        }
        Ok(())
    }
}
