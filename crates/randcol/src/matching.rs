//! Target column resolution

use std::collections::HashSet;

use crate::config::{MatchRule, TargetColumnSpec};
use randcol_core::Table;

/// Canonical form used for tolerant column matching: all whitespace removed,
/// lowercased.
///
/// ```
/// use randcol::normalize;
///
/// assert_eq!(normalize(" МЗ  1/60 "), "мз1/60");
/// ```
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// How a header was matched to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Fuzzy,
}

/// A table column selected for randomization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMatch {
    /// Column index in the table
    pub index: usize,
    /// Header name as it appears in the file
    pub name: String,
    /// Canonical target name that selected the column
    pub target: String,
    pub kind: MatchKind,
}

/// Find the table columns named by `targets`.
///
/// For each target, in order: an exact header match wins; otherwise every
/// header whose normalized form contains the normalized target is taken
/// (all of them when several match). A column is listed once, under the
/// first target that selected it. An empty result means there is nothing to
/// do for this table.
pub fn resolve_columns(table: &Table, targets: &[TargetColumnSpec]) -> Vec<ColumnMatch> {
    let names = table.column_names();
    let normalized: Vec<String> = names.iter().map(|n| normalize(n)).collect();

    let mut seen = HashSet::new();
    let mut matches = Vec::new();

    for target in targets {
        if let Some(index) = names.iter().position(|n| *n == target.name) {
            if seen.insert(index) {
                matches.push(ColumnMatch {
                    index,
                    name: names[index].clone(),
                    target: target.name.clone(),
                    kind: MatchKind::Exact,
                });
            }
            continue;
        }

        if target.rule == MatchRule::Exact {
            continue;
        }

        let wanted = normalize(&target.name);
        if wanted.is_empty() {
            continue;
        }

        let similar: Vec<usize> = normalized
            .iter()
            .enumerate()
            .filter(|(_, n)| n.contains(&wanted))
            .map(|(i, _)| i)
            .collect();

        if similar.is_empty() {
            log::debug!("no column found for '{}'", target.name);
            continue;
        }

        let similar_names: Vec<&str> = similar.iter().map(|&i| names[i].as_str()).collect();
        if similar.len() > 1 {
            log::warn!(
                "ambiguous match for '{}': {:?}, all of them will be processed",
                target.name,
                similar_names
            );
        } else {
            log::info!(
                "found similar column for '{}': {:?}",
                target.name,
                similar_names
            );
        }

        for index in similar {
            if seen.insert(index) {
                matches.push(ColumnMatch {
                    index,
                    name: names[index].clone(),
                    target: target.name.clone(),
                    kind: MatchKind::Fuzzy,
                });
            }
        }
    }

    matches
}
