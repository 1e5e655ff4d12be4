//! Error types for the randomizer

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`RandomizerError`]
pub type Result<T> = std::result::Result<T, RandomizerError>;

/// Errors that can occur while processing a file or preparing a batch
#[derive(Debug, Error)]
pub enum RandomizerError {
    /// Filesystem error, with the path it happened on
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// XLSX read/write error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] randcol_xlsx::XlsxError),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] randcol_csv::CsvError),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] randcol_core::Error),

    /// File extension not handled by any codec
    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Rejected configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RandomizerError {
    /// Wrap an I/O error with the path it concerns
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        RandomizerError::Io {
            path: path.into(),
            source,
        }
    }
}
