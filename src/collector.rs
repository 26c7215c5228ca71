/*!
 * Expansion of selected directories into a flat file list
 */

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::diagnostics::SharedSink;
use crate::error::{CombinerError, Result};
use crate::rules::IgnoreRules;
use crate::selection::SelectionSet;

/// Files found for a selection, plus the failures recovered along the way
#[derive(Debug, Default)]
pub struct Collection {
    /// Absolute file paths in discovery order until sorted
    pub files: Vec<PathBuf>,
    /// Directories or rule files that could not be read
    pub errors: Vec<CombinerError>,
}

impl Collection {
    /// Order files by ascending depth, keeping discovery order on ties
    pub fn sort_by_depth(&mut self) {
        sort_by_depth(&mut self.files);
    }

    /// Whether some part of the selection could not be expanded
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Recursive collector honouring `.file_combiner.ignore` scopes
pub struct FileCollector {
    /// Scopes discovered so far
    rules: IgnoreRules,
    /// Diagnostic output
    sink: SharedSink,
}

impl FileCollector {
    /// Create a new collector
    pub fn new(config: &Config, sink: SharedSink) -> Self {
        let rules = if config.ignore_ignore_files {
            IgnoreRules::disabled()
        } else {
            IgnoreRules::new()
        };
        Self { rules, sink }
    }

    /// Scopes gathered by the last collection
    pub fn rules(&self) -> &IgnoreRules {
        &self.rules
    }

    /// Expand every selected root into files.
    ///
    /// Selected files are taken as-is, even when a rule would hide them.
    /// Directories are walked with rule scopes from all their ancestors plus
    /// any rule file met on the way down.
    pub fn collect(&mut self, selection: &SelectionSet) -> Collection {
        let mut collection = Collection::default();

        for entry in selection.entries().iter().filter(|e| e.is_dir) {
            let errors = self.rules.collect_upward(&entry.path, self.sink.as_ref());
            collection.errors.extend(errors);
        }

        for entry in selection.entries() {
            if entry.is_dir {
                self.collect_directory(&entry.path, &mut collection);
            } else {
                // kept regardless, the content block will carry the failure
                if let Err(source) = fs::metadata(&entry.path) {
                    let e = CombinerError::PathStat {
                        path: entry.path.clone(),
                        source,
                    };
                    self.sink.warn(&e.to_string());
                    collection.errors.push(e);
                }
                self.sink
                    .note(&format!("including selected file {}", entry.path.display()));
                collection.files.push(entry.path.clone());
            }
        }

        collection
    }

    fn collect_directory(&mut self, dir: &Path, collection: &mut Collection) {
        if let Err(e) = self.rules.discover(dir, self.sink.as_ref()) {
            self.sink.warn(&e.to_string());
            collection.errors.push(e);
        }

        let entries = match list_entries(dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.sink.warn(&e.to_string());
                collection.errors.push(e);
                return;
            }
        };

        for entry in entries {
            let path = entry.path();
            if let Some((scope, pattern)) = self.rules.ignored_by(path) {
                self.sink.note(&format!(
                    "skipping {} (pattern '{}' from {})",
                    path.display(),
                    pattern,
                    scope.display()
                ));
                continue;
            }

            if entry.file_type().is_dir() {
                self.collect_directory(path, collection);
            } else {
                collection.files.push(path.to_path_buf());
            }
        }
    }
}

/// Immediate children of `dir` in enumeration order
pub(crate) fn list_entries(dir: &Path) -> Result<Vec<DirEntry>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| CombinerError::from_walk(dir.to_path_buf(), e))
}

/// Number of components in `path`
pub fn path_depth(path: &Path) -> usize {
    path.components().count()
}

/// Stable sort by ascending [`path_depth`]
pub fn sort_by_depth(files: &mut [PathBuf]) {
    files.sort_by_key(|p| path_depth(p));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NullSink;
    use crate::rules::IGNORE_FILE_NAME;
    use crate::selection::resolve;
    use std::io;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn collector(config: &Config) -> FileCollector {
        FileCollector::new(config, Arc::new(NullSink))
    }

    #[test]
    fn test_depth_sort_is_stable() {
        let mut files = vec![
            PathBuf::from("/r/a/b/c.txt"),
            PathBuf::from("/r/z.txt"),
            PathBuf::from("/r/a/y.txt"),
            PathBuf::from("/r/b.txt"),
        ];
        sort_by_depth(&mut files);
        assert_eq!(
            files,
            vec![
                PathBuf::from("/r/z.txt"),
                PathBuf::from("/r/b.txt"),
                PathBuf::from("/r/a/y.txt"),
                PathBuf::from("/r/a/b/c.txt"),
            ]
        );
        assert!(files.windows(2).all(|w| path_depth(&w[0]) <= path_depth(&w[1])));
    }

    #[test]
    fn test_nested_rule_file_scopes_its_subtree() -> io::Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("inner").join("deep"))?;
        fs::create_dir_all(root.join("outer"))?;
        fs::write(root.join("inner").join(IGNORE_FILE_NAME), "skip.txt\n")?;
        fs::write(root.join("inner").join("deep").join("skip.txt"), "x")?;
        fs::write(root.join("inner").join("keep.txt"), "x")?;
        fs::write(root.join("outer").join("skip.txt"), "x")?;

        let config = Config::new(vec![root.clone()]);
        let selection = resolve(config.roots.clone(), &NullSink);
        let collection = collector(&config).collect(&selection);

        assert!(collection.errors.is_empty());
        assert!(collection.files.contains(&root.join("inner").join("keep.txt")));
        assert!(collection.files.contains(&root.join("outer").join("skip.txt")));
        assert!(!collection
            .files
            .contains(&root.join("inner").join("deep").join("skip.txt")));
        Ok(())
    }

    #[test]
    fn test_ignored_directory_is_not_entered() -> io::Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("src").join("gen"))?;
        fs::write(root.join(IGNORE_FILE_NAME), "src/gen\n")?;
        fs::write(root.join("src").join("gen").join("out.rs"), "x")?;
        fs::write(root.join("src").join("lib.rs"), "x")?;

        let config = Config::new(vec![root.clone()]);
        let selection = resolve(config.roots.clone(), &NullSink);
        let collection = collector(&config).collect(&selection);

        assert!(collection.files.contains(&root.join("src").join("lib.rs")));
        assert!(collection.files.iter().all(|f| !f.starts_with(root.join("src/gen"))));
        Ok(())
    }

    #[test]
    fn test_explicit_file_selection_overrides_rules() -> io::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join(IGNORE_FILE_NAME), "secret.txt\n")?;
        fs::write(dir.path().join("secret.txt"), "x")?;

        let config = Config::new(vec![dir.path().join("secret.txt")]);
        let selection = resolve(config.roots.clone(), &NullSink);
        let collection = collector(&config).collect(&selection);

        assert_eq!(collection.files, vec![dir.path().join("secret.txt")]);
        Ok(())
    }

    #[test]
    fn test_ignore_ignore_files_keeps_everything() -> io::Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("root");
        fs::create_dir(&root)?;
        fs::write(root.join(IGNORE_FILE_NAME), "secret.txt\n")?;
        fs::write(root.join("secret.txt"), "x")?;

        let mut config = Config::new(vec![root.clone()]);
        config.ignore_ignore_files = true;
        let selection = resolve(config.roots.clone(), &NullSink);
        let collection = collector(&config).collect(&selection);

        assert!(collection.files.contains(&root.join("secret.txt")));
        assert!(collection.files.contains(&root.join(IGNORE_FILE_NAME)));
        Ok(())
    }

    #[test]
    fn test_missing_selected_file_is_kept() {
        let missing = PathBuf::from("/no/such/selected/file.txt");
        let config = Config::new(vec![missing.clone()]);
        let selection = resolve(config.roots.clone(), &NullSink);
        let collection = collector(&config).collect(&selection);

        assert_eq!(collection.files, vec![missing]);
        assert!(collection.is_partial());
        assert!(matches!(
            collection.errors.as_slice(),
            [CombinerError::PathStat { .. }]
        ));
    }

    #[test]
    fn test_missing_directory_is_reported_not_fatal() -> io::Result<()> {
        let dir = tempdir()?;
        let mut collection = Collection::default();
        let mut collector = collector(&Config::new(vec![]));
        collector.collect_directory(&dir.path().join("gone"), &mut collection);

        assert!(collection.files.is_empty());
        assert!(matches!(
            collection.errors.as_slice(),
            [CombinerError::DirectoryRead { .. }]
        ));
        Ok(())
    }
}
