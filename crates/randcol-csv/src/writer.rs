//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{CsvLayout, CsvWriteOptions, LineTerminator};
use randcol_core::{CellValue, Table};

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a table (header first) to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        table: &Table,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(table, file, options)
    }

    /// Write a table to a writer
    pub fn write<W: Write>(table: &Table, writer: W, options: &CsvWriteOptions) -> CsvResult<()> {
        Self::write_with_layout(table, writer, options, &CsvLayout::default())
    }

    /// Write a table back in the layout it was read with.
    ///
    /// The layout's terminator, when known, wins over the options'. Blank
    /// records above the header are written again, and each record keeps its
    /// original field count unless a value now sits past it.
    pub fn write_with_layout<W: Write>(
        table: &Table,
        writer: W,
        options: &CsvWriteOptions,
        layout: &CsvLayout,
    ) -> CsvResult<()> {
        let terminator = match layout.line_terminator.unwrap_or(options.line_terminator) {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .flexible(true)
            .from_writer(writer);

        let leading = &layout.record_widths[..table.header_row().min(layout.record_widths.len())];
        for &width in leading.iter().filter(|&&width| width > 0) {
            csv_writer.write_record(vec![""; width])?;
        }

        let rows = std::iter::once(table.headers()).chain(table.rows().iter().map(Vec::as_slice));
        for (idx, cells) in rows.enumerate() {
            let used = cells.iter().rposition(|c| !c.is_empty()).map_or(0, |last| last + 1);
            let width = layout
                .record_widths
                .get(table.header_row() + idx)
                .map_or(cells.len(), |&original| original.max(used));

            let record: Vec<String> = cells
                .iter()
                .take(width)
                .map(CellValue::to_string)
                .collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
