//! Error types for randcol-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A1 reference that does not name a worksheet cell
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Data cell outside the table
    #[error("Cell ({row}, {col}) outside a table of {rows} rows and {columns} columns")]
    CellOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        columns: usize,
    },
}
