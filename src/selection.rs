/*!
 * Selection deduplication and common ancestor computation
 */

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::diagnostics::DiagnosticSink;

/// A selected root path with its cached directory flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Absolute path
    pub path: PathBuf,
    /// Whether the path was a directory when resolved
    pub is_dir: bool,
}

impl PathEntry {
    /// Stat `path` once. A failed stat is treated as a file so the entry is
    /// kept and the failure shows up later when it is read.
    pub fn resolve(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_dir = fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false);
        Self { path, is_dir }
    }
}

/// Deduplicated selection: no entry lies inside another entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    entries: Vec<PathEntry>,
}

impl SelectionSet {
    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add one candidate, keeping the containment invariant.
    ///
    /// Returns false when the candidate was already covered by a kept entry.
    pub fn insert(&mut self, candidate: PathEntry, sink: &dyn DiagnosticSink) -> bool {
        if let Some(owner) = self.entries.iter().find(|kept| {
            kept.path == candidate.path || (kept.is_dir && is_contained(&kept.path, &candidate.path))
        }) {
            sink.note(&format!(
                "selection {} already covered by {}",
                candidate.path.display(),
                owner.path.display()
            ));
            return false;
        }

        if candidate.is_dir {
            let evicted: Vec<usize> = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, kept)| is_contained(&candidate.path, &kept.path))
                .map(|(index, _)| index)
                .collect();

            // back to front so earlier indices stay valid
            for index in evicted.into_iter().rev() {
                let removed = self.entries.remove(index);
                sink.note(&format!(
                    "selection {} superseded by {}",
                    removed.path.display(),
                    candidate.path.display()
                ));
            }
        }

        self.entries.push(candidate);
        true
    }
}

/// Whether `child` lies strictly inside `parent`. Equal paths are not contained.
pub fn is_contained(parent: &Path, child: &Path) -> bool {
    child != parent && child.starts_with(parent)
}

/// Collapse a raw selection so that no entry is a descendant of another.
///
/// Candidates are visited shortest first. A file is kept unless a directory
/// already kept contains it. A directory is dropped when a kept directory
/// contains it; otherwise it evicts every kept entry it contains.
pub fn resolve<I, P>(raw_paths: I, sink: &dyn DiagnosticSink) -> SelectionSet
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut candidates: Vec<PathEntry> = raw_paths.into_iter().map(PathEntry::resolve).collect();
    candidates.sort_by_key(|entry| entry.path.as_os_str().len());

    let mut set = SelectionSet {
        entries: Vec::with_capacity(candidates.len()),
    };
    for candidate in candidates {
        set.insert(candidate, sink);
    }

    set
}

/// Deepest directory shared by the parents of every path.
///
/// No paths gives an empty path; a single path gives its parent. When the
/// parents share nothing the filesystem root is returned.
pub fn common_ancestor<P: AsRef<Path>>(paths: &[P]) -> PathBuf {
    match paths {
        [] => PathBuf::new(),
        [only] => parent_dir(only.as_ref()),
        _ => {
            let parents: Vec<Vec<Component<'_>>> = paths
                .iter()
                .map(|p| p.as_ref().parent().unwrap_or(p.as_ref()).components().collect())
                .collect();
            let min_len = parents.iter().map(Vec::len).min().unwrap_or(0);

            let mut shared = PathBuf::new();
            for index in 0..min_len {
                let component = parents[0][index];
                if parents.iter().all(|components| components[index] == component) {
                    shared.push(component);
                } else {
                    break;
                }
            }

            if shared.as_os_str().is_empty() {
                root_marker()
            } else {
                shared
            }
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None => path.to_path_buf(),
    }
}

fn root_marker() -> PathBuf {
    PathBuf::from(std::path::MAIN_SEPARATOR_STR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NullSink;
    use std::io;
    use tempfile::tempdir;

    fn paths(set: &SelectionSet) -> Vec<PathBuf> {
        set.paths()
    }

    #[test]
    fn test_directory_supersedes_contained_file() -> io::Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("root");
        fs::create_dir(&root)?;
        fs::write(root.join("a.txt"), "a")?;

        let set = resolve([root.join("a.txt"), root.clone()], &NullSink);
        assert_eq!(paths(&set), vec![root]);
        Ok(())
    }

    #[test]
    fn test_directory_added_after_child_evicts_it() -> io::Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("r");
        fs::create_dir_all(root.join("sub"))?;
        fs::write(root.join("b.txt"), "b")?;
        fs::write(root.join("sub").join("c.txt"), "c")?;
        let other = dir.path().join("x.md");
        fs::write(&other, "x")?;

        let mut set = SelectionSet::default();
        assert!(set.insert(PathEntry::resolve(root.join("b.txt")), &NullSink));
        assert!(set.insert(PathEntry::resolve(other.clone()), &NullSink));
        assert!(set.insert(PathEntry::resolve(root.join("sub")), &NullSink));
        assert!(!set.insert(PathEntry::resolve(root.join("sub").join("c.txt")), &NullSink));
        assert!(set.insert(PathEntry::resolve(root.clone()), &NullSink));

        assert_eq!(set.paths(), vec![other, root]);
        Ok(())
    }

    #[test]
    fn test_duplicates_collapse_and_resolution_is_idempotent() -> io::Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("a");
        fs::create_dir(&a)?;
        let f = dir.path().join("f.txt");
        fs::write(&f, "f")?;

        let once = resolve([a.clone(), f.clone(), a.clone(), f.clone()], &NullSink);
        assert_eq!(once.len(), 2);

        let twice = resolve(once.paths(), &NullSink);
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_no_entry_is_descendant_of_another() -> io::Result<()> {
        let dir = tempdir()?;
        let base = dir.path();
        fs::create_dir_all(base.join("a/b/c"))?;
        fs::create_dir_all(base.join("d"))?;
        fs::write(base.join("a/b/c/f.txt"), "")?;
        fs::write(base.join("d/g.txt"), "")?;

        let raw = vec![
            base.join("a/b/c/f.txt"),
            base.join("a/b"),
            base.join("d/g.txt"),
            base.join("a/b/c"),
            base.join("a"),
            base.join("d/g.txt"),
        ];
        let set = resolve(raw, &NullSink);
        for x in set.entries() {
            for y in set.entries() {
                assert!(!is_contained(&x.path, &y.path));
            }
        }
        assert_eq!(set.paths(), vec![base.join("a"), base.join("d/g.txt")]);
        Ok(())
    }

    #[test]
    fn test_missing_path_is_kept_as_file() {
        let set = resolve(["/no/such/path/anywhere"], &NullSink);
        assert_eq!(set.len(), 1);
        assert!(!set.entries()[0].is_dir);
    }

    #[test]
    fn test_equal_paths_are_not_contained() {
        assert!(!is_contained(Path::new("/a/b"), Path::new("/a/b")));
        assert!(is_contained(Path::new("/a"), Path::new("/a/b")));
        assert!(!is_contained(Path::new("/a/b"), Path::new("/a/bc")));
    }

    #[test]
    fn test_common_ancestor() {
        let none: [&Path; 0] = [];
        assert_eq!(common_ancestor(&none), PathBuf::new());
        assert_eq!(common_ancestor(&["/a/x.txt"]), PathBuf::from("/a"));
        assert_eq!(common_ancestor(&["/a/x.txt", "/a/y.txt"]), PathBuf::from("/a"));
        assert_eq!(
            common_ancestor(&["/root/sub/a.txt", "/root/b.txt"]),
            PathBuf::from("/root")
        );
        assert_eq!(common_ancestor(&["/x/1.txt", "/y/2.txt"]), PathBuf::from("/"));
        assert_eq!(common_ancestor(&["x/1.txt", "y/2.txt"]), root_marker());
    }
}
