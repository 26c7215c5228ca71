/*!
 * Binary content detection
 */

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use once_cell::sync::Lazy;

/// Number of leading bytes inspected when sampling a file
pub const SAMPLE_SIZE: usize = 4096;

/// Extensions that are always treated as binary, whatever their bytes say
pub static BINARY_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Images
        "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp",
        // Documents
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
        // Archives
        "zip", "rar", "7z", "tar", "gz", "bz2",
        // Executables and libraries
        "exe", "dll", "so", "dylib",
        // Audio and video
        "mp3", "mp4", "avi", "mov", "mkv", "flv",
    ]
    .into_iter()
    .collect()
});

/// Classify a file as binary.
///
/// A file is binary when its extension is on the denylist, or when its first
/// [`SAMPLE_SIZE`] bytes contain a NUL or a control character other than tab,
/// line feed and carriage return. Files that cannot be sampled are reported
/// as binary so their bytes never end up in the output.
pub fn is_binary(path: &Path) -> bool {
    classify(path).unwrap_or(true)
}

/// Like [`is_binary`], but hands sampling failures back to the caller
pub fn classify(path: &Path) -> io::Result<bool> {
    if has_binary_extension(path) {
        return Ok(true);
    }

    let sample = read_sample(path)?;
    Ok(looks_binary(&sample))
}

/// Whether the extension of `path` is on the denylist (case-insensitive)
pub fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(ext.as_str()))
}

/// Whether a byte sample contains NUL or disallowed control characters
pub fn looks_binary(sample: &[u8]) -> bool {
    sample
        .iter()
        .any(|&b| b == 0x00 || (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r')))
}

fn read_sample(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(SAMPLE_SIZE);
    file.take(SAMPLE_SIZE as u64).read_to_end(&mut sample)?;
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_control_bytes() {
        assert!(looks_binary(b"abc\0def"));
        assert!(looks_binary(&[0x1b, b'[', b'm']));
        assert!(!looks_binary(b"line one\r\n\tline two\n"));
        assert!(!looks_binary(b""));
    }

    #[test]
    fn test_extension_denylist_wins_over_content() -> io::Result<()> {
        let dir = tempdir()?;
        let image = dir.path().join("logo.PNG");
        fs::write(&image, "plain text pretending to be an image\n")?;

        assert!(has_binary_extension(&image));
        assert!(is_binary(&image));
        Ok(())
    }

    #[test]
    fn test_sample_only_covers_leading_bytes() -> io::Result<()> {
        let dir = tempdir()?;
        let late_nul = dir.path().join("late.txt");
        let mut bytes = vec![b'a'; SAMPLE_SIZE];
        bytes.push(0);
        fs::write(&late_nul, &bytes)?;

        let early_nul = dir.path().join("early.txt");
        bytes[SAMPLE_SIZE - 1] = 0;
        fs::write(&early_nul, &bytes)?;

        assert!(!is_binary(&late_nul));
        assert!(is_binary(&early_nul));
        Ok(())
    }

    #[test]
    fn test_unreadable_is_binary() {
        let missing = Path::new("/definitely/not/here.txt");
        assert!(is_binary(missing));
        assert!(classify(missing).is_err());
    }
}
