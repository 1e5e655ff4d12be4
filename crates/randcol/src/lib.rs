//! # randcol
//!
//! Replaces the numeric cells of selected spreadsheet columns with random
//! values drawn from a fixed range, for a whole directory of files.
//!
//! Each file is backed up once, read, randomized in the configured columns
//! and written under the same name into the output directory. Columns are
//! found by exact header text, or failing that by a whitespace- and
//! case-insensitive substring match. Cells that are empty or not numeric are
//! left as they were, as is every other column.
//!
//! ## Example
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use randcol::{ColumnRandomizer, RandomizerConfig};
//! use randcol_core::{CellValue, Table};
//!
//! let mut table = Table::with_headers(["Part", " МЗ  1/60 "]);
//! table.push_row(vec![CellValue::string("A-1"), CellValue::Number(19.0)]);
//!
//! let config = RandomizerConfig::default();
//! let mut randomizer = ColumnRandomizer::with_rng(config, StdRng::seed_from_u64(3))?;
//! let columns = randomizer.resolve_columns(&table);
//! randomizer.randomize_table(&mut table, &columns)?;
//!
//! let value = table.get(0, 1).and_then(CellValue::as_number).unwrap();
//! assert!((20.9..=22.1).contains(&value));
//! # Ok::<(), randcol::RandomizerError>(())
//! ```

mod batch;
pub mod config;
pub mod error;
pub mod files;
pub mod format;
pub mod generate;
pub mod matching;
pub mod processor;

pub use batch::BatchSummary;
pub use config::{
    MatchRule, RandomizerConfig, TargetColumnSpec, ValueRange, DEFAULT_TARGET_COLUMNS,
};
pub use error::{RandomizerError, Result};
pub use format::{Document, FileFormat};
pub use generate::generate_value;
pub use matching::{normalize, resolve_columns, ColumnMatch, MatchKind};
pub use processor::{ColumnRandomizer, ColumnReport, FileOutcome, FileReport, ProcessMode};
