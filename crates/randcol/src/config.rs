//! Randomizer configuration

use std::path::PathBuf;

use crate::error::{RandomizerError, Result};

/// Tightening-torque columns processed when no columns are configured
pub const DEFAULT_TARGET_COLUMNS: [&str; 7] = [
    "МЗ 1/60", "МЗ 2/60", "МЗ 3/60", "УЗ 3/60", "МЗ 1/40", "МЗ 2/40", "МЗ 3/40",
];

/// Default lower bound for generated values
pub const DEFAULT_MIN_VALUE: f64 = 20.9;

/// Default upper bound for generated values
pub const DEFAULT_MAX_VALUE: f64 = 22.1;

/// Default number of fractional digits kept in generated values
pub const DEFAULT_DECIMALS: u32 = 13;

/// Largest scale `rust_decimal` can round to
pub const MAX_DECIMALS: u32 = 28;

/// Default number of files inspected by a dry run
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Inclusive range for generated values, with the number of fractional
/// digits to keep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    min: f64,
    max: f64,
    decimals: u32,
}

impl ValueRange {
    /// Create a range; both bounds and their distance must be finite, and
    /// `min <= max`
    pub fn new(min: f64, max: f64, decimals: u32) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(RandomizerError::InvalidConfig(format!(
                "range bounds must be finite, got [{}, {}]",
                min, max
            )));
        }
        if min > max {
            return Err(RandomizerError::InvalidConfig(format!(
                "range minimum {} exceeds maximum {}",
                min, max
            )));
        }
        if !(max - min).is_finite() {
            return Err(RandomizerError::InvalidConfig(format!(
                "range [{}, {}] is too wide to sample from",
                min, max
            )));
        }
        if decimals > MAX_DECIMALS {
            return Err(RandomizerError::InvalidConfig(format!(
                "at most {} decimals are supported, got {}",
                MAX_DECIMALS, decimals
            )));
        }
        Ok(Self { min, max, decimals })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Check whether a value lies within the bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_VALUE,
            max: DEFAULT_MAX_VALUE,
            decimals: DEFAULT_DECIMALS,
        }
    }
}

/// How a target column name may be matched against a header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchRule {
    /// Only the exact header text matches
    Exact,
    /// Exact text first, otherwise any header containing the name once
    /// whitespace and case are ignored
    #[default]
    ExactOrNormalized,
}

/// A column the randomizer should rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetColumnSpec {
    pub name: String,
    pub rule: MatchRule,
}

impl TargetColumnSpec {
    /// Target matched exactly or by normalized substring
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            rule: MatchRule::ExactOrNormalized,
        }
    }

    /// Target matched by exact header text only
    pub fn exact<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            rule: MatchRule::Exact,
        }
    }
}

impl From<&str> for TargetColumnSpec {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Everything the randomizer needs, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomizerConfig {
    /// Directory scanned for input spreadsheets
    pub input_dir: PathBuf,
    /// Directory receiving rewritten files (same file names)
    pub output_dir: PathBuf,
    /// Directory receiving untouched copies of the originals
    pub backup_dir: PathBuf,
    /// Columns to rewrite, in order
    pub targets: Vec<TargetColumnSpec>,
    /// Range for generated values
    pub range: ValueRange,
    /// Copy access/modification times of the original onto the output
    pub preserve_timestamps: bool,
    /// File extensions picked up from the input directory (without dot)
    pub extensions: Vec<String>,
    /// Number of files inspected by a dry run
    pub sample_size: usize,
}

impl Default for RandomizerConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("src/xlsx"),
            output_dir: PathBuf::from("output"),
            backup_dir: PathBuf::from("backup"),
            targets: DEFAULT_TARGET_COLUMNS
                .iter()
                .map(|name| TargetColumnSpec::new(*name))
                .collect(),
            range: ValueRange::default(),
            preserve_timestamps: true,
            extensions: vec!["xlsx".to_string()],
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl RandomizerConfig {
    /// Reject configurations the randomizer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(RandomizerError::InvalidConfig(
                "no target columns configured".into(),
            ));
        }
        if let Some(blank) = self.targets.iter().find(|t| t.name.trim().is_empty()) {
            return Err(RandomizerError::InvalidConfig(format!(
                "blank target column name {:?}",
                blank.name
            )));
        }
        if self.extensions.is_empty() {
            return Err(RandomizerError::InvalidConfig(
                "no file extensions configured".into(),
            ));
        }
        if self.sample_size == 0 {
            return Err(RandomizerError::InvalidConfig(
                "sample size must be at least 1".into(),
            ));
        }
        // Re-check in case the range was built field by field elsewhere
        ValueRange::new(self.range.min, self.range.max, self.range.decimals)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RandomizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.targets.len(), 7);
        assert_eq!(config.targets[3].name, "УЗ 3/60");
        assert_eq!(config.range.min(), 20.9);
        assert_eq!(config.range.max(), 22.1);
        assert!(config.preserve_timestamps);
    }

    #[test]
    fn test_value_range_rejects_bad_bounds() {
        assert!(ValueRange::new(22.1, 20.9, 13).is_err());
        assert!(ValueRange::new(f64::NAN, 1.0, 13).is_err());
        assert!(ValueRange::new(0.0, f64::INFINITY, 13).is_err());
        assert!(ValueRange::new(0.0, 1.0, 29).is_err());
        assert!(ValueRange::new(5.0, 5.0, 0).is_ok());
    }

    #[test]
    fn test_value_range_rejects_overflowing_width() {
        assert!(ValueRange::new(-1e308, 1e308, 13).is_err());
        assert!(ValueRange::new(f64::MIN, f64::MAX, 0).is_err());
        assert!(ValueRange::new(-1e307, 1e307, 13).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_and_blank_targets() {
        let mut config = RandomizerConfig {
            targets: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.targets = vec![TargetColumnSpec::new("  ")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_sample_and_no_extensions() {
        let config = RandomizerConfig {
            sample_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RandomizerConfig {
            extensions: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
