//! randcol CLI - randomize numeric spreadsheet columns in bulk

mod menu;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use randcol::{
    BatchSummary, ColumnRandomizer, FileOutcome, RandomizerConfig, TargetColumnSpec, ValueRange,
    DEFAULT_TARGET_COLUMNS,
};
use std::io;
use std::path::PathBuf;

use menu::Action;

#[derive(Parser)]
#[command(name = "randcol")]
#[command(
    author,
    version,
    about = "Replace numeric values in selected spreadsheet columns with random values",
    allow_negative_numbers = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory with the spreadsheets to process
    #[arg(long, global = true, default_value = "src/xlsx")]
    input_dir: PathBuf,

    /// Directory receiving the processed files
    #[arg(long, global = true, default_value = "output")]
    output_dir: PathBuf,

    /// Directory receiving copies of the originals
    #[arg(long, global = true, default_value = "backup")]
    backup_dir: PathBuf,

    /// Column to randomize; repeat for several (default: torque columns)
    #[arg(short, long = "column", global = true)]
    columns: Vec<String>,

    /// Only match column headers exactly
    #[arg(long, global = true)]
    exact: bool,

    /// Lower bound of generated values
    #[arg(long, global = true, default_value_t = randcol::config::DEFAULT_MIN_VALUE)]
    min: f64,

    /// Upper bound of generated values
    #[arg(long, global = true, default_value_t = randcol::config::DEFAULT_MAX_VALUE)]
    max: f64,

    /// Fractional digits kept in generated values
    #[arg(long, global = true, default_value_t = randcol::config::DEFAULT_DECIMALS)]
    decimals: u32,

    /// Do not copy file timestamps onto the output
    #[arg(long, global = true)]
    no_preserve_dates: bool,

    /// File extension to pick up; repeat for several (default: xlsx)
    #[arg(short, long = "extension", global = true)]
    extensions: Vec<String>,

    /// Number of files inspected by the analysis
    #[arg(long, global = true, default_value_t = randcol::config::DEFAULT_SAMPLE_SIZE)]
    sample_size: usize,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Choose the mode interactively (default)
    Menu,
    /// Report target columns in the first files without writing anything
    #[command(alias = "test")]
    Analyze,
    /// Randomize every file
    Apply,
    /// Randomize only the first file
    Smoke,
}

impl Cli {
    fn config(&self) -> Result<RandomizerConfig> {
        let names: Vec<String> = if self.columns.is_empty() {
            DEFAULT_TARGET_COLUMNS.iter().map(|s| s.to_string()).collect()
        } else {
            self.columns.clone()
        };
        let targets = names
            .into_iter()
            .map(|name| {
                if self.exact {
                    TargetColumnSpec::exact(name)
                } else {
                    TargetColumnSpec::new(name)
                }
            })
            .collect();

        let extensions = if self.extensions.is_empty() {
            vec!["xlsx".to_string()]
        } else {
            self.extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect()
        };

        Ok(RandomizerConfig {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            backup_dir: self.backup_dir.clone(),
            targets,
            range: ValueRange::new(self.min, self.max, self.decimals)
                .context("Invalid value range")?,
            preserve_timestamps: !self.no_preserve_dates,
            extensions,
            sample_size: self.sample_size,
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.config()?;
    log::debug!("{:?}", config);
    let mut randomizer = ColumnRandomizer::new(config).context("Invalid configuration")?;

    let action = match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            let mut preserve = randomizer.config().preserve_timestamps;
            let chosen = menu::run(
                io::stdin().lock(),
                io::stdout(),
                &randomizer.config().range,
                randomizer.config().sample_size,
                &mut preserve,
            )
            .context("Failed to read menu choice")?;
            randomizer.set_preserve_timestamps(preserve);

            match chosen {
                Some(action) => action,
                None => return Ok(()),
            }
        }
        Commands::Analyze => Action::Analyze,
        Commands::Apply => Action::ApplyAll,
        Commands::Smoke => Action::Smoke,
    };

    run(&mut randomizer, action)
}

fn run(randomizer: &mut ColumnRandomizer, action: Action) -> Result<()> {
    randomizer
        .prepare_directories()
        .context("Failed to create output directories")?;

    let input_dir = randomizer.config().input_dir.clone();
    let files = randomizer
        .discover_files()
        .with_context(|| format!("Failed to list '{}'", input_dir.display()))?;

    if files.is_empty() {
        println!("No files found in '{}'", input_dir.display());
        return Ok(());
    }

    let summary = match action {
        Action::Analyze => randomizer.analyze_sample(&files),
        Action::ApplyAll => randomizer.apply_all(&files),
        Action::Smoke => randomizer.smoke_test(&files),
    };

    print_summary(action, &summary);
    Ok(())
}

fn print_summary(action: Action, summary: &BatchSummary) {
    println!();
    for outcome in &summary.outcomes {
        let name = outcome
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(report) = outcome.report() {
            if !report.other_sheets.is_empty() {
                println!(
                    "{}: only the first sheet is written, leaving out {}",
                    name,
                    report.other_sheets.join(", ")
                );
            }
        }

        match outcome {
            FileOutcome::Analyzed(report) => {
                println!("{}: {} rows, {} columns", name, report.rows, report.columns);
                for column in &report.matched {
                    let range = match (column.current_min, column.current_max) {
                        (Some(min), Some(max)) => format!("[{}, {}]", min, max),
                        _ => "-".to_string(),
                    };
                    println!(
                        "  {:<16} {:>6} numeric / {:<6} non-empty  {}",
                        column.name, column.numeric, column.non_empty, range
                    );
                }
            }
            FileOutcome::Modified { report, output } => {
                println!(
                    "{}: {} values replaced -> {}",
                    name,
                    report.replaced_cells(),
                    output.display()
                );
            }
            FileOutcome::NoColumnsFound(_) => println!("{}: skipped, no target columns", name),
            FileOutcome::NoNumericData(_) => println!("{}: skipped, no numeric data", name),
            FileOutcome::Failed { error, .. } => println!("{}: failed, {}", name, error),
        }
    }

    if action != Action::Analyze {
        println!();
        println!(
            "Modified: {}, skipped: {}, failed: {} (of {})",
            summary.modified(),
            summary.skipped(),
            summary.failed(),
            summary.total()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["randcol"]).unwrap();
        assert!(cli.command.is_none());

        let config = cli.config().unwrap();
        assert_eq!(config, RandomizerConfig::default());
    }

    #[test]
    fn test_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "randcol",
            "apply",
            "--column",
            "Torque A",
            "-c",
            "Torque B",
            "--exact",
            "--min",
            "1",
            "--max",
            "2",
            "--decimals",
            "3",
            "--no-preserve-dates",
            "-e",
            ".CSV",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Apply)));

        let config = cli.config().unwrap();
        assert_eq!(
            config.targets,
            vec![TargetColumnSpec::exact("Torque A"), TargetColumnSpec::exact("Torque B")]
        );
        assert_eq!(config.range, ValueRange::new(1.0, 2.0, 3).unwrap());
        assert!(!config.preserve_timestamps);
        assert_eq!(config.extensions, vec!["CSV".to_string()]);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let cli = Cli::try_parse_from(["randcol", "--min", "5", "--max", "1"]).unwrap();
        assert!(cli.config().is_err());
    }

    #[test]
    fn test_overflowing_range_rejected() {
        let cli = Cli::try_parse_from(["randcol", "--min", "-1e308", "--max", "1e308"]).unwrap();
        assert!(cli.config().is_err());
    }
}
