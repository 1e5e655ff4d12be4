//! Per-file processing: analysis and randomization

use std::fmt;
use std::path::{Path, PathBuf};

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::config::RandomizerConfig;
use crate::error::{RandomizerError, Result};
use crate::files::{backup_file, mirrored_path, preserve_timestamps, write_atomically};
use crate::format::{Document, FileFormat};
use crate::generate::generate_value;
use crate::matching::{resolve_columns, ColumnMatch, MatchKind};
use randcol_core::{CellValue, Table};

/// Number of new values kept per column for reporting
const SAMPLE_VALUES: usize = 3;

/// What [`ColumnRandomizer::process_file`] does with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMode {
    /// Read and report, never write
    Analyze,
    /// Back up, randomize and write the output
    Apply,
}

impl fmt::Display for ProcessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessMode::Analyze => write!(f, "analyze"),
            ProcessMode::Apply => write!(f, "apply"),
        }
    }
}

/// Statistics for one resolved column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnReport {
    /// Header as found in the file
    pub name: String,
    /// Target that selected the column
    pub target: String,
    pub kind: MatchKind,
    /// Cells holding any value
    pub non_empty: usize,
    /// Cells that parse as a number
    pub numeric: usize,
    /// Smallest numeric value before randomization
    pub current_min: Option<f64>,
    /// Largest numeric value before randomization
    pub current_max: Option<f64>,
    /// Cells overwritten (apply mode only)
    pub replaced: usize,
    /// First few generated values (apply mode only)
    pub samples: Vec<f64>,
}

impl ColumnReport {
    fn collect(table: &Table, column: &ColumnMatch) -> Self {
        let mut report = ColumnReport {
            name: column.name.clone(),
            target: column.target.clone(),
            kind: column.kind,
            non_empty: 0,
            numeric: 0,
            current_min: None,
            current_max: None,
            replaced: 0,
            samples: Vec::new(),
        };

        for (row, value) in table.column(column.index).enumerate() {
            if value.is_empty() {
                continue;
            }
            report.non_empty += 1;

            if let Some(n) = table.numeric(row, column.index) {
                report.numeric += 1;
                report.current_min = Some(report.current_min.map_or(n, |m| m.min(n)));
                report.current_max = Some(report.current_max.map_or(n, |m| m.max(n)));
            }
        }

        report
    }
}

/// Shape of a file plus the columns selected in it
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    /// Data rows, header excluded
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    /// Sheets other than the one processed; the output does not contain them
    pub other_sheets: Vec<String>,
    pub matched: Vec<ColumnReport>,
}

impl FileReport {
    fn new(path: &Path, document: &Document) -> Self {
        let table = &document.table;
        Self {
            path: path.to_path_buf(),
            rows: table.row_count(),
            columns: table.column_count(),
            column_names: table.column_names(),
            other_sheets: document.other_sheets.clone(),
            matched: Vec::new(),
        }
    }

    /// Numeric cells across every matched column
    pub fn numeric_cells(&self) -> usize {
        self.matched.iter().map(|c| c.numeric).sum()
    }

    /// Cells overwritten across every matched column
    pub fn replaced_cells(&self) -> usize {
        self.matched.iter().map(|c| c.replaced).sum()
    }
}

/// Result of processing one file
#[derive(Debug)]
pub enum FileOutcome {
    /// Dry run finished; nothing was written
    Analyzed(FileReport),
    /// Output written
    Modified { report: FileReport, output: PathBuf },
    /// None of the target columns exist in the file
    NoColumnsFound(FileReport),
    /// Target columns exist but hold no numeric cell
    NoNumericData(FileReport),
    /// Reading, writing or backing up failed
    Failed {
        path: PathBuf,
        error: RandomizerError,
    },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Analyzed(report)
            | FileOutcome::Modified { report, .. }
            | FileOutcome::NoColumnsFound(report)
            | FileOutcome::NoNumericData(report) => &report.path,
            FileOutcome::Failed { path, .. } => path,
        }
    }

    pub fn report(&self) -> Option<&FileReport> {
        match self {
            FileOutcome::Analyzed(report)
            | FileOutcome::Modified { report, .. }
            | FileOutcome::NoColumnsFound(report)
            | FileOutcome::NoNumericData(report) => Some(report),
            FileOutcome::Failed { .. } => None,
        }
    }

    pub fn is_modified(&self) -> bool {
        matches!(self, FileOutcome::Modified { .. })
    }

    /// File left alone because there was nothing to randomize
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            FileOutcome::NoColumnsFound(_) | FileOutcome::NoNumericData(_)
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

/// Replaces numeric cells of the configured columns with random values.
///
/// Generic over the random source so callers can supply a seeded generator.
pub struct ColumnRandomizer<R = ThreadRng> {
    config: RandomizerConfig,
    rng: R,
}

impl ColumnRandomizer<ThreadRng> {
    /// Randomizer drawing from the thread-local generator
    pub fn new(config: RandomizerConfig) -> Result<Self> {
        Self::with_rng(config, rand::thread_rng())
    }
}

impl<R: Rng> ColumnRandomizer<R> {
    /// Randomizer drawing from `rng`; fails if `config` does not validate
    pub fn with_rng(config: RandomizerConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &RandomizerConfig {
        &self.config
    }

    pub fn set_preserve_timestamps(&mut self, preserve: bool) {
        self.config.preserve_timestamps = preserve;
    }

    /// Columns of `table` selected by the configured targets
    pub fn resolve_columns(&self, table: &Table) -> Vec<ColumnMatch> {
        resolve_columns(table, &self.config.targets)
    }

    /// One fresh value from the configured range
    pub fn generate_value(&mut self) -> f64 {
        generate_value(&self.config.range, &mut self.rng)
    }

    /// Overwrite every numeric cell of `columns` with a fresh value.
    ///
    /// Each returned report carries the statistics taken before the cells
    /// were replaced. Empty, non-numeric and date cells are left untouched.
    pub fn randomize_table(
        &mut self,
        table: &mut Table,
        columns: &[ColumnMatch],
    ) -> Result<Vec<ColumnReport>> {
        let mut reports = Vec::with_capacity(columns.len());

        for column in columns {
            let mut report = ColumnReport::collect(table, column);

            let numeric_rows: Vec<usize> = (0..table.row_count())
                .filter(|&row| table.numeric(row, column.index).is_some())
                .collect();

            for row in numeric_rows {
                let value = self.generate_value();
                table.set(row, column.index, CellValue::Number(value))?;
                if report.samples.len() < SAMPLE_VALUES {
                    report.samples.push(value);
                }
                report.replaced += 1;
            }

            reports.push(report);
        }

        Ok(reports)
    }

    /// Analyze or randomize one file.
    ///
    /// Errors never escape: they are logged and returned as
    /// [`FileOutcome::Failed`] so a batch can carry on with the next file.
    pub fn process_file(&mut self, path: &Path, mode: ProcessMode) -> FileOutcome {
        match self.try_process(path, mode) {
            Ok(outcome) => outcome,
            Err(error) => {
                log::error!("failed to process {}: {}", path.display(), error);
                FileOutcome::Failed {
                    path: path.to_path_buf(),
                    error,
                }
            }
        }
    }

    fn try_process(&mut self, path: &Path, mode: ProcessMode) -> Result<FileOutcome> {
        if FileFormat::from_path(path).is_none() {
            return Err(RandomizerError::UnsupportedFormat(path.to_path_buf()));
        }

        if mode == ProcessMode::Apply {
            backup_file(path, &self.config.backup_dir)?;
        }

        let mut document = Document::open(path)?;
        let mut report = FileReport::new(path, &document);
        log::info!(
            "read {}: {} rows, {} columns",
            path.display(),
            report.rows,
            report.columns
        );
        log::debug!("columns: {:?}", report.column_names);

        let columns = self.resolve_columns(&document.table);
        if columns.is_empty() {
            log::warn!("no target columns in {}, skipping", path.display());
            return Ok(FileOutcome::NoColumnsFound(report));
        }

        if mode == ProcessMode::Analyze {
            report.matched = columns
                .iter()
                .map(|column| ColumnReport::collect(&document.table, column))
                .collect();
            log_columns(&report);
            return Ok(FileOutcome::Analyzed(report));
        }

        report.matched = self.randomize_table(&mut document.table, &columns)?;
        log_columns(&report);

        if report.numeric_cells() == 0 {
            log::warn!("no numeric data in {}, skipping", path.display());
            return Ok(FileOutcome::NoNumericData(report));
        }

        let output = mirrored_path(path, &self.config.output_dir)?;
        write_atomically(&output, |file| document.write(file))?;
        log::info!(
            "saved {} ({} values replaced)",
            output.display(),
            report.replaced_cells()
        );

        if self.config.preserve_timestamps {
            match preserve_timestamps(path, &output) {
                Ok(()) => log::debug!("timestamps copied to {}", output.display()),
                Err(e) => log::warn!("could not preserve timestamps: {}", e),
            }
        }

        Ok(FileOutcome::Modified { report, output })
    }
}

fn log_columns(report: &FileReport) {
    for column in &report.matched {
        match (column.current_min, column.current_max) {
            (Some(min), Some(max)) => log::info!(
                "column '{}': {} numeric of {} values, range [{}, {}]",
                column.name,
                column.numeric,
                column.non_empty,
                min,
                max
            ),
            _ => log::info!(
                "column '{}': no numeric values ({} non-empty)",
                column.name,
                column.non_empty
            ),
        }
        if !column.samples.is_empty() {
            log::info!("  new values: {:?}", column.samples);
        }
    }
}
