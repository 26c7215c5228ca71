/*!
 * Configuration handling for filecombiner
 */

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use crate::ensure;
use crate::error::Result;
use crate::report::ReportFormat;
use crate::utils::absolute_path;

/// Command-line arguments for filecombiner
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "file-combiner",
    version = env!("CARGO_PKG_VERSION"),
    about = "Combine selected files and directories into one annotated text document",
    long_about = "Expands the selected paths (honouring .file_combiner.ignore files), renders a directory tree marking the included files, and concatenates every text file between path-labelled markers."
)]
pub struct Args {
    /// Files and directories to combine
    pub paths: Vec<String>,

    /// Write the document to this file instead of stdout
    #[clap(short, long)]
    pub output: Option<String>,

    /// Only show selected files (and the directories leading to them) in the tree
    #[clap(long)]
    pub only_selected: bool,

    /// Do not read any .file_combiner.ignore file
    #[clap(long)]
    pub ignore_ignore_files: bool,

    /// Summary printed to stderr after combining
    #[clap(long, value_enum, default_value_t = ReportFormat::default())]
    pub report: ReportFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[clap(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Absolute root paths, in the order given
    pub roots: Vec<PathBuf>,

    /// Output file path (stdout when `None`)
    pub output_file: Option<PathBuf>,

    /// Render only included files and their directories
    pub only_selected: bool,

    /// Bypass all `.file_combiner.ignore` processing
    pub ignore_ignore_files: bool,

    /// Report printed after combining
    pub report_format: ReportFormat,
}

impl Config {
    /// Library configuration for the given roots, both flags off
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            output_file: None,
            only_selected: false,
            ignore_ignore_files: false,
            report_format: ReportFormat::None,
        }
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        Self {
            roots: args.paths.iter().map(|p| absolute_path(p)).collect(),
            output_file: args.output.map(PathBuf::from),
            only_selected: args.only_selected,
            ignore_ignore_files: args.ignore_ignore_files,
            report_format: args.report,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.roots.is_empty(), Config, "No paths to combine were given");

        // Check if output file directory exists
        if let Some(parent) = self.output_file.as_ref().and_then(|p| p.parent()) {
            ensure!(
                parent.as_os_str().is_empty() || parent.exists(),
                Config,
                "Output directory not found: {}",
                parent.display()
            );
        }

        Ok(())
    }

    /// Human readable output destination
    pub fn output_label(&self) -> String {
        match &self.output_file {
            Some(path) => path.display().to_string(),
            None => "stdout".to_string(),
        }
    }
}
