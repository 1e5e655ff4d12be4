//! # randcol-core
//!
//! Core data structures for the randcol column randomizer.
//!
//! This crate provides the fundamental types shared by the codecs and the
//! randomizer:
//! - [`CellValue`] - Represents cell values (numbers, strings, booleans, errors)
//! - [`CellAddress`] - A1-style cell addressing used by the XLSX codec
//! - [`Table`] - A header row plus data rows, addressed by column
//! - [`NumberFormat`] - Cell display formats, kept so dates survive a rewrite
//!
//! ## Example
//!
//! ```rust
//! use randcol_core::{CellValue, NumberFormat, Table};
//!
//! let mut table = Table::with_headers(["Part", "МЗ 1/60", "Date"]);
//! table.push_row(vec![
//!     CellValue::string("A-1"),
//!     CellValue::Number(21.4),
//!     CellValue::Number(45123.0),
//! ]);
//! table.set_number_format(0, 2, NumberFormat::BuiltIn(14))?;
//!
//! assert_eq!(table.column_names(), vec!["Part", "МЗ 1/60", "Date"]);
//! assert_eq!(table.numeric(0, 1), Some(21.4));
//! assert_eq!(table.numeric(0, 2), None);
//! # Ok::<(), randcol_core::Error>(())
//! ```

pub mod address;
pub mod error;
pub mod number_format;
pub mod table;
pub mod value;

pub use address::CellAddress;
pub use error::{Error, Result};
pub use number_format::NumberFormat;
pub use table::Table;
pub use value::{CellError, CellValue, SharedString};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
