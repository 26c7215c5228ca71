/*!
 * Concatenation of file contents into delimited blocks
 */

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use serde::Serialize;

use crate::binary::is_binary;
use crate::diagnostics::SharedSink;
use crate::error::CombinerError;
use crate::report::{FileKind, FileReportInfo};

/// Text emitted instead of the bytes of a binary file
pub const BINARY_PLACEHOLDER: &str = "[binary file, content omitted]";

/// Line opening the block of `path`
pub fn start_marker(path: &Path) -> String {
    format!(
        "================file content start: [{}]================",
        path.display()
    )
}

/// Line closing the block of `path`
pub fn end_marker(path: &Path) -> String {
    format!(
        "================file content end: [{}]================",
        path.display()
    )
}

/// Counters gathered while assembling
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssemblyStatistics {
    /// Number of blocks emitted
    pub files_processed: usize,
    /// Blocks carrying text content
    pub text_files: usize,
    /// Blocks carrying the binary placeholder
    pub binary_files: usize,
    /// Blocks carrying a read error
    pub unreadable_files: usize,
    /// Lines of text emitted
    pub total_lines: usize,
    /// Characters of text emitted
    pub total_chars: usize,
    /// Bytes read from disk for text files
    pub total_bytes: u64,
    /// Details for each file
    pub file_details: HashMap<String, FileReportInfo>,
}

impl AssemblyStatistics {
    fn record(&mut self, path: &Path, info: FileReportInfo) {
        self.files_processed += 1;
        match info.kind {
            FileKind::Text => self.text_files += 1,
            FileKind::Binary => self.binary_files += 1,
            FileKind::Unreadable => self.unreadable_files += 1,
        }
        self.total_lines += info.lines;
        self.total_chars += info.chars;
        self.total_bytes += info.bytes;
        self.file_details
            .insert(path.to_string_lossy().to_string(), info);
    }
}

/// Concatenated content plus its statistics
#[derive(Debug, Default)]
pub struct Assembly {
    pub content: String,
    pub statistics: AssemblyStatistics,
    /// Files replaced by an inline error
    pub errors: Vec<CombinerError>,
}

/// Builds the content block for an ordered file list
pub struct ContentAssembler {
    /// Progress bar
    progress: Arc<ProgressBar>,
    sink: SharedSink,
}

impl ContentAssembler {
    /// Create a new assembler
    pub fn new(progress: Arc<ProgressBar>, sink: SharedSink) -> Self {
        Self { progress, sink }
    }

    /// Emit one delimited block per file, in the given order.
    ///
    /// A file that cannot be read gets an inline error instead of content;
    /// the remaining files are unaffected.
    pub fn assemble(&self, files: &[PathBuf]) -> Assembly {
        let mut assembly = Assembly::default();

        for path in files {
            self.progress.inc(1);
            self.progress
                .set_message(format!("Current file: {}", display_name(path)));

            let (body, info, error) = self.read_block(path);

            assembly.content.push_str(&start_marker(path));
            assembly.content.push('\n');
            assembly.content.push_str(&body);
            if !body.ends_with('\n') {
                assembly.content.push('\n');
            }
            assembly.content.push_str(&end_marker(path));
            assembly.content.push_str("\n\n");

            assembly.statistics.record(path, info);
            assembly.errors.extend(error);
        }

        assembly
    }

    fn read_block(&self, path: &Path) -> (String, FileReportInfo, Option<CombinerError>) {
        let content = if is_binary(path) {
            Ok(None)
        } else {
            fs::read(path).map(Some)
        };
        self.block_body(path, content)
    }

    /// Body of the block for `path` given what reading it produced
    fn block_body(
        &self,
        path: &Path,
        content: io::Result<Option<Vec<u8>>>,
    ) -> (String, FileReportInfo, Option<CombinerError>) {
        match content {
            Ok(None) => {
                self.sink
                    .note(&format!("omitting binary file {}", path.display()));
                (
                    BINARY_PLACEHOLDER.to_string(),
                    FileReportInfo::new(FileKind::Binary),
                    None,
                )
            }
            Ok(Some(bytes)) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                let info = FileReportInfo {
                    lines: text.lines().count(),
                    chars: text.chars().count(),
                    bytes: bytes.len() as u64,
                    ..FileReportInfo::new(FileKind::Text)
                };
                (text, info, None)
            }
            Err(e) => {
                self.sink
                    .warn(&format!("cannot read file {}: {}", path.display(), e));
                (
                    format!("error: unable to read file - {}", e),
                    FileReportInfo::new(FileKind::Unreadable),
                    Some(CombinerError::FileRead {
                        path: path.to_path_buf(),
                        source: e,
                    }),
                )
            }
        }
    }
}

// Keep progress messages short enough for one terminal line
fn display_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let count = file_name.chars().count();
    if count > 40 {
        let tail: String = file_name.chars().skip(count - 37).collect();
        format!("...{}", tail)
    } else {
        file_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NullSink;
    use std::io;
    use tempfile::tempdir;

    fn assembler() -> ContentAssembler {
        ContentAssembler::new(Arc::new(ProgressBar::hidden()), Arc::new(NullSink))
    }

    #[test]
    fn test_block_framing_and_trailing_newline() -> io::Result<()> {
        let dir = tempdir()?;
        let with_newline = dir.path().join("a.txt");
        let without_newline = dir.path().join("b.txt");
        fs::write(&with_newline, "alpha\n")?;
        fs::write(&without_newline, "beta")?;

        let assembly = assembler().assemble(&[with_newline.clone(), without_newline.clone()]);
        let expected = format!(
            "{}\nalpha\n{}\n\n{}\nbeta\n{}\n\n",
            start_marker(&with_newline),
            end_marker(&with_newline),
            start_marker(&without_newline),
            end_marker(&without_newline),
        );
        assert_eq!(assembly.content, expected);
        assert_eq!(assembly.statistics.text_files, 2);
        assert_eq!(assembly.statistics.total_lines, 2);
        Ok(())
    }

    #[test]
    fn test_binary_file_gets_placeholder() -> io::Result<()> {
        let dir = tempdir()?;
        let image = dir.path().join("pic.png");
        fs::write(&image, [0x89, b'P', b'N', b'G', 0, 0, 0, 13])?;

        let assembly = assembler().assemble(&[image.clone()]);
        assert!(assembly.content.contains(BINARY_PLACEHOLDER));
        assert!(!assembly.content.contains("PNG"));
        assert_eq!(assembly.statistics.binary_files, 1);
        Ok(())
    }

    #[test]
    fn test_unsampled_file_gets_placeholder() -> io::Result<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("vanished.txt");
        let present = dir.path().join("ok.txt");
        fs::write(&present, "fine\n")?;

        let assembly = assembler().assemble(&[missing.clone(), present.clone()]);

        let missing_block = format!(
            "{}\n{}\n{}\n\n",
            start_marker(&missing),
            BINARY_PLACEHOLDER,
            end_marker(&missing)
        );
        assert!(assembly.content.contains(&missing_block));
        assert!(assembly.content.contains("fine\n"));
        assert_eq!(assembly.statistics.binary_files, 1);
        assert_eq!(assembly.statistics.text_files, 1);
        assert!(assembly.errors.is_empty());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_gets_placeholder() -> io::Result<()> {
        let dir = tempdir()?;
        let link = dir.path().join("dangling.txt");
        std::os::unix::fs::symlink(dir.path().join("nowhere.txt"), &link)?;

        let assembly = assembler().assemble(&[link.clone()]);

        assert!(assembly.content.contains(BINARY_PLACEHOLDER));
        assert!(!assembly.content.contains("error: unable to read file"));
        assert_eq!(assembly.statistics.unreadable_files, 0);
        Ok(())
    }

    #[test]
    fn test_failed_full_read_gets_inline_error() {
        let path = PathBuf::from("/data/notes.txt");
        let failure = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");

        let (body, info, error) = assembler().block_body(&path, Err(failure));

        assert_eq!(body, "error: unable to read file - permission denied");
        assert_eq!(info.kind, FileKind::Unreadable);
        assert!(matches!(
            error,
            Some(CombinerError::FileRead { path: ref p, .. }) if *p == path
        ));
    }

    #[test]
    fn test_display_name_truncates_long_names() {
        let long = PathBuf::from(format!("/x/{}.txt", "n".repeat(60)));
        let shown = display_name(&long);
        assert!(shown.starts_with("..."));
        assert_eq!(shown.chars().count(), 40);
        assert_eq!(display_name(Path::new("/x/short.rs")), "short.rs");
    }
}
