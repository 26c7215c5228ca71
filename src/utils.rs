/*!
 * Utility functions for filecombiner
 */

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Absolute form of a user supplied path.
///
/// Existing paths are canonicalized. Anything else is joined onto the current
/// directory so it still reaches the pipeline and fails visibly there.
pub fn absolute_path(raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }

    if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
