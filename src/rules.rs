/*!
 * Ignore rule discovery and matching
 *
 * Rule files are named `.file_combiner.ignore`. Each one defines a scope: the
 * directory it lives in plus the literal patterns it lists. A pattern matches
 * a path either by basename anywhere below the scope, or by the path relative
 * to the scope directory (exact, or as a directory prefix). There is no glob
 * syntax.
 *
 * Basename patterns are strictly broader than relative ones: `build` hides
 * every `build` below the scope, so a narrower `src/build` next to it adds
 * nothing. Both are kept as written.
 */

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::diagnostics::DiagnosticSink;
use crate::error::{CombinerError, Result};

/// Name of the per-directory rule file
pub const IGNORE_FILE_NAME: &str = ".file_combiner.ignore";

/// Set of literal patterns loaded from one rule file
pub type PatternSet = BTreeSet<String>;

/// Ignore scopes keyed by the directory that defines them
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    scopes: BTreeMap<PathBuf, PatternSet>,
    disabled: bool,
}

impl IgnoreRules {
    /// Empty rule set that still discovers rule files
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule set that never loads anything and never ignores anything
    pub fn disabled() -> Self {
        Self {
            scopes: BTreeMap::new(),
            disabled: true,
        }
    }

    /// Load every rule file from `start_dir` up to the filesystem root
    pub fn collect(start_dir: &Path, sink: &dyn DiagnosticSink) -> Self {
        let mut rules = Self::new();
        rules.collect_upward(start_dir, sink);
        rules
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Iterate over `(scope directory, patterns)` pairs
    pub fn scopes(&self) -> impl Iterator<Item = (&Path, &PatternSet)> {
        self.scopes.iter().map(|(dir, patterns)| (dir.as_path(), patterns))
    }

    /// Patterns defined by the rule file in `dir`, if any
    pub fn patterns(&self, dir: &Path) -> Option<&PatternSet> {
        self.scopes.get(dir)
    }

    /// Add patterns to the scope of `dir`, merging with what is already there
    pub fn insert(&mut self, dir: PathBuf, patterns: PatternSet) {
        self.scopes.entry(dir).or_default().extend(patterns);
    }

    /// Merge another rule set into this one
    pub fn merge(&mut self, other: IgnoreRules) {
        for (dir, patterns) in other.scopes {
            self.insert(dir, patterns);
        }
    }

    /// Walk from `start_dir` to the root, loading rule files on the way.
    ///
    /// Unreadable rule files are reported to `sink` and contribute nothing.
    /// The errors are also returned so callers can surface them.
    pub fn collect_upward(
        &mut self,
        start_dir: &Path,
        sink: &dyn DiagnosticSink,
    ) -> Vec<CombinerError> {
        let mut errors = Vec::new();
        if self.disabled {
            return errors;
        }

        let mut current = start_dir;
        loop {
            if let Err(e) = self.discover(current, sink) {
                sink.warn(&e.to_string());
                errors.push(e);
            }

            match current.parent() {
                Some(parent) if parent != current && !parent.as_os_str().is_empty() => {
                    current = parent
                }
                _ => break,
            }
        }

        errors
    }

    /// Load the rule file directly inside `dir`, if there is one.
    ///
    /// Returns whether a rule file was found and loaded. A rule file that
    /// cannot be read still claims an empty scope, so it is attempted once.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn discover(&mut self, dir: &Path, sink: &dyn DiagnosticSink) -> Result<bool> {
        if self.disabled || self.scopes.contains_key(dir) {
            return Ok(false);
        }

        let rule_file = dir.join(IGNORE_FILE_NAME);
        if !rule_file.is_file() {
            return Ok(false);
        }

        let bytes = match fs::read(&rule_file) {
            Ok(bytes) => bytes,
            Err(source) => {
                self.insert(dir.to_path_buf(), PatternSet::new());
                return Err(CombinerError::IgnoreFileRead {
                    path: rule_file,
                    source,
                });
            }
        };
        let patterns = parse_patterns(&String::from_utf8_lossy(&bytes));
        sink.note(&format!(
            "loaded {} ignore pattern(s) from {}",
            patterns.len(),
            rule_file.display()
        ));
        self.insert(dir.to_path_buf(), patterns);
        Ok(true)
    }

    /// Find the scope and pattern that hide `path`.
    ///
    /// A scope only applies to paths strictly below its own directory.
    pub fn ignored_by(&self, path: &Path) -> Option<(&Path, &str)> {
        if self.disabled {
            return None;
        }

        self.scopes
            .iter()
            .filter(|(dir, _)| path != dir.as_path() && path.starts_with(dir))
            .find_map(|(dir, patterns)| {
                matching_pattern(path, dir, patterns).map(|pattern| (dir.as_path(), pattern))
            })
    }

    /// Whether any scope hides `path`
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.ignored_by(path).is_some()
    }
}

/// Parse a rule file: one literal pattern per line, `#` comments, blanks skipped
pub fn parse_patterns(content: &str) -> PatternSet {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Whether `candidate` is hidden by one of `patterns` defined in `scope_dir`
pub fn matches(candidate: &Path, scope_dir: &Path, patterns: &PatternSet) -> bool {
    matching_pattern(candidate, scope_dir, patterns).is_some()
}

fn matching_pattern<'a>(
    candidate: &Path,
    scope_dir: &Path,
    patterns: &'a PatternSet,
) -> Option<&'a str> {
    if let Some(name) = candidate.file_name() {
        let name = name.to_string_lossy();
        if let Some(pattern) = patterns.get(&*name) {
            return Some(pattern.as_str());
        }
    }

    let relative = candidate.strip_prefix(scope_dir).ok()?;
    let relative = relative.to_string_lossy();
    if relative.is_empty() {
        return None;
    }

    patterns
        .iter()
        .find(|pattern| {
            relative == pattern.as_str()
                || relative
                    .strip_prefix(pattern.as_str())
                    .is_some_and(|rest| rest.starts_with(MAIN_SEPARATOR))
        })
        .map(String::as_str)
}
