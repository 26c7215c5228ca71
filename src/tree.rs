/*!
 * ASCII directory tree rendering
 */

use std::collections::HashSet;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use walkdir::DirEntry;

use crate::collector::list_entries;
use crate::diagnostics::SharedSink;
use crate::error::CombinerError;
use crate::rules::IgnoreRules;

/// Annotation appended to files whose content is in the output
pub const INCLUDED_MARKER: &str = " [included]";

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Renders a directory subtree, marking files that are part of the output
pub struct TreeRenderer {
    /// Files whose content is emitted
    included: HashSet<PathBuf>,
    /// Every directory that holds an included file, at any depth
    included_dirs: HashSet<PathBuf>,
    /// Ignore scopes, grown with rule files met while rendering
    rules: IgnoreRules,
    /// Only show included files and the directories leading to them
    only_selected: bool,
    sink: SharedSink,
}

impl TreeRenderer {
    /// Create a renderer for the given final file list
    pub fn new(
        included_files: &[PathBuf],
        rules: IgnoreRules,
        only_selected: bool,
        sink: SharedSink,
    ) -> Self {
        let included: HashSet<PathBuf> = included_files.iter().cloned().collect();
        let included_dirs = included_files
            .iter()
            .flat_map(|file| file.ancestors().skip(1))
            .map(Path::to_path_buf)
            .collect();

        Self {
            included,
            included_dirs,
            rules,
            only_selected,
            sink,
        }
    }

    /// Render `root_dir` and everything below it that survives filtering.
    ///
    /// The root itself is always shown; ignore rules apply to its entries.
    pub fn render(&mut self, root_dir: &Path) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "{}", directory_label(root_dir));
        self.render_children(root_dir, "", &mut output);
        output
    }

    fn render_children(&mut self, dir: &Path, prefix: &str, output: &mut String) {
        if let Err(e) = self.rules.discover(dir, self.sink.as_ref()) {
            self.sink.warn(&e.to_string());
        }

        let entries = match list_entries(dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.sink.warn(&e.to_string());
                let _ = writeln!(
                    output,
                    "{}error: unable to read directory - {}",
                    prefix,
                    error_message(&e)
                );
                return;
            }
        };

        // symlinks, sockets and fifos are not drawn
        let (dirs, files): (Vec<DirEntry>, Vec<DirEntry>) = entries
            .into_iter()
            .filter(|e| e.file_type().is_dir() || e.file_type().is_file())
            .partition(|e| e.file_type().is_dir());

        let dirs: Vec<PathBuf> = dirs
            .into_iter()
            .map(DirEntry::into_path)
            .filter(|path| self.is_visible_dir(path))
            .collect();
        let files: Vec<PathBuf> = files
            .into_iter()
            .map(DirEntry::into_path)
            .filter(|path| self.is_visible_file(path))
            .collect();

        let total = dirs.len() + files.len();

        for (index, path) in dirs.iter().enumerate() {
            let is_last = index + 1 == total;
            let _ = writeln!(
                output,
                "{}{}{}",
                prefix,
                if is_last { LAST_BRANCH } else { BRANCH },
                directory_label(path)
            );
            let child_prefix = format!("{}{}", prefix, if is_last { SPACE } else { PIPE });
            self.render_children(path, &child_prefix, output);
        }

        for (index, path) in files.iter().enumerate() {
            let is_last = dirs.len() + index + 1 == total;
            let marker = if self.included.contains(path) {
                INCLUDED_MARKER
            } else {
                ""
            };
            let _ = writeln!(
                output,
                "{}{}{}{}",
                prefix,
                if is_last { LAST_BRANCH } else { BRANCH },
                entry_name(path),
                marker
            );
        }
    }

    fn is_visible_dir(&self, path: &Path) -> bool {
        if self.is_ignored(path) {
            return false;
        }
        !self.only_selected || self.included_dirs.contains(path)
    }

    fn is_visible_file(&self, path: &Path) -> bool {
        if self.is_ignored(path) {
            return false;
        }
        !self.only_selected || self.included.contains(path)
    }

    fn is_ignored(&self, path: &Path) -> bool {
        match self.rules.ignored_by(path) {
            Some((scope, pattern)) => {
                self.sink.note(&format!(
                    "hiding {} from tree (pattern '{}' from {})",
                    path.display(),
                    pattern,
                    scope.display()
                ));
                true
            }
            None => false,
        }
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// `<name>/`, or the bare path for the filesystem root
fn directory_label(path: &Path) -> String {
    match path.file_name() {
        Some(name) => format!("{}/", name.to_string_lossy()),
        None => path.display().to_string(),
    }
}

fn error_message(err: &CombinerError) -> String {
    match err {
        CombinerError::DirectoryRead { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}
