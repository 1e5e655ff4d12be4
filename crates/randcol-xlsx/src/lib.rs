//! # randcol-xlsx
//!
//! XLSX (Office Open XML) reader and writer for randcol tables.
//!
//! Only the first worksheet is read; its first non-empty row becomes the
//! table header. Writing produces a single-sheet workbook with inline
//! strings, the header at its original row, and the cells' number formats.

pub mod error;
pub mod reader;
mod styles;
pub mod writer;

pub use error::{XlsxError, XlsxResult};
pub use reader::{XlsxDocument, XlsxReader};
pub use writer::XlsxWriter;
