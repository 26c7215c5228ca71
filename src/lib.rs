/*!
 * filecombiner - Combine selected files into one annotated text document
 *
 * Takes a set of selected files and directories, expands directories while
 * honouring `.file_combiner.ignore` rule files, renders a directory tree that
 * marks the included files, and concatenates every file's content between
 * path-labelled markers.
 */

pub mod assembler;
pub mod binary;
pub mod collector;
pub mod combiner;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod report;
pub mod rules;
pub mod selection;
pub mod tree;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use assembler::{Assembly, AssemblyStatistics, ContentAssembler};
pub use binary::is_binary;
pub use collector::{Collection, FileCollector};
pub use combiner::{Combined, Combiner};
pub use config::Config;
pub use diagnostics::{DiagnosticSink, LogSink, MemorySink, NullSink};
pub use error::{CombinerError, Result};
pub use report::{CombineReport, FileKind, FileReportInfo, ReportFormat, Reporter};
pub use rules::{IgnoreRules, IGNORE_FILE_NAME};
pub use selection::{common_ancestor, resolve, PathEntry, SelectionSet};
pub use tree::TreeRenderer;
pub use writer::OutputWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
