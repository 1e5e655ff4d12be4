//! Batch runs over the input directory

use std::path::PathBuf;

use rand::Rng;

use crate::error::Result;
use crate::files;
use crate::processor::{ColumnRandomizer, FileOutcome, ProcessMode};

/// Per-file outcomes of a batch plus their tallies
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    /// Files written to the output directory
    pub fn modified(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_modified()).count()
    }

    /// Files without target columns or numeric data
    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

impl<R: Rng> ColumnRandomizer<R> {
    /// Create the output and backup directories
    pub fn prepare_directories(&self) -> Result<()> {
        let config = self.config();
        files::prepare_directories([&config.output_dir, &config.backup_dir])
    }

    /// Spreadsheets in the input directory, sorted by name
    pub fn discover_files(&self) -> Result<Vec<PathBuf>> {
        let config = self.config();
        let found = files::discover_files(&config.input_dir, &config.extensions)?;
        log::info!(
            "found {} file(s) in {}",
            found.len(),
            config.input_dir.display()
        );
        Ok(found)
    }

    /// Dry run over the first `sample_size` files
    pub fn analyze_sample(&mut self, files: &[PathBuf]) -> BatchSummary {
        let take = self.config().sample_size.min(files.len());
        log::info!("analyzing {} of {} file(s)", take, files.len());
        self.run(&files[..take], ProcessMode::Analyze)
    }

    /// Randomize every file
    pub fn apply_all(&mut self, files: &[PathBuf]) -> BatchSummary {
        let summary = self.run(files, ProcessMode::Apply);
        log::info!(
            "done: {} modified, {} skipped, {} failed of {}",
            summary.modified(),
            summary.skipped(),
            summary.failed(),
            summary.total()
        );
        summary
    }

    /// Randomize the first file only
    pub fn smoke_test(&mut self, files: &[PathBuf]) -> BatchSummary {
        let first = files.first().map(std::slice::from_ref).unwrap_or_default();
        self.run(first, ProcessMode::Apply)
    }

    fn run(&mut self, files: &[PathBuf], mode: ProcessMode) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for (i, path) in files.iter().enumerate() {
            log::info!("--- File {}/{} ({}): {} ---", i + 1, files.len(), mode, path.display());
            summary.outcomes.push(self.process_file(path, mode));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RandomizerConfig;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;

    #[test]
    fn test_prepare_and_discover() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("b.csv"), "МЗ 1/60\n1\n").unwrap();
        fs::write(input.join("a.csv"), "МЗ 1/60\n1\n").unwrap();
        fs::write(input.join("skip.txt"), "").unwrap();

        let config = RandomizerConfig {
            input_dir: input.clone(),
            output_dir: dir.path().join("out"),
            backup_dir: dir.path().join("nested/backup"),
            extensions: vec!["csv".into()],
            ..Default::default()
        };
        let randomizer = ColumnRandomizer::with_rng(config, StdRng::seed_from_u64(1)).unwrap();

        randomizer.prepare_directories().unwrap();
        assert!(dir.path().join("out").is_dir());
        assert!(dir.path().join("nested/backup").is_dir());

        let found = randomizer.discover_files().unwrap();
        assert_eq!(found, vec![input.join("a.csv"), input.join("b.csv")]);
    }

    #[test]
    fn test_empty_batch() {
        let mut randomizer =
            ColumnRandomizer::with_rng(RandomizerConfig::default(), StdRng::seed_from_u64(1))
                .unwrap();

        assert_eq!(randomizer.smoke_test(&[]).total(), 0);
        assert_eq!(randomizer.analyze_sample(&[]).total(), 0);
        assert_eq!(randomizer.apply_all(&[]).modified(), 0);
    }
}
