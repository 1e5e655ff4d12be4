//! CSV options

/// Options for reading CSV files
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Convert numeric and TRUE/FALSE fields to typed values.
    ///
    /// Off by default so that untouched fields are written back with their
    /// original text (`"21.50"` stays `"21.50"`).
    pub auto_detect_types: bool,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            auto_detect_types: false,
        }
    }
}

/// Options for writing CSV files
#[derive(Debug, Clone)]
pub struct CsvWriteOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Line terminator
    pub line_terminator: LineTerminator,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            line_terminator: LineTerminator::CRLF,
        }
    }
}

/// Line terminator type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    /// Unix-style (LF)
    LF,
    /// Windows-style (CRLF)
    CRLF,
}

/// Shape of a CSV file that a table does not record.
///
/// Produced by [`crate::CsvReader::read_with_layout`]; handing it back to
/// [`crate::CsvWriter::write_with_layout`] keeps the file's line endings,
/// blank leading records and short records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsvLayout {
    /// Terminator found after the first record, if any record ended in one
    pub line_terminator: Option<LineTerminator>,
    /// Number of fields in each record, in file order
    pub record_widths: Vec<usize>,
}
