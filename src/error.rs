//! Global error handling for filecombiner
//!
//! Most failures while combining files are recovered where they happen and
//! recorded next to the output. Only a failure to produce the output artifact
//! itself is returned to the caller as a terminal error.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Global error type for filecombiner operations
#[derive(Error, Debug)]
pub enum CombinerError {
    /// A selected root could not be inspected
    #[error("Cannot stat {path}: {source}")]
    PathStat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory could not be enumerated
    #[error("Cannot read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file's content could not be read
    #[error("Cannot read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An ignore rule file exists but could not be read
    #[error("Cannot read ignore file {path}: {source}")]
    IgnoreFileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The combined document could not be written
    #[error("Output error: {0}")]
    Output(String),
}

impl CombinerError {
    /// Convert a walkdir failure for `path` into a directory read error
    pub(crate) fn from_walk(path: PathBuf, err: walkdir::Error) -> Self {
        let source = err
            .into_io_error()
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop detected"));
        CombinerError::DirectoryRead { path, source }
    }
}

/// Specialized Result type for filecombiner operations
pub type Result<T> = std::result::Result<T, CombinerError>;

/// Creates a CombinerError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::CombinerError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

// Lets main return io::Result like the rest of the CLI plumbing
impl From<CombinerError> for io::Error {
    fn from(err: CombinerError) -> Self {
        io::Error::new(io::ErrorKind::Other, err.to_string())
    }
}
