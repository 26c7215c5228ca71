/*!
 * Reporting functionality for filecombiner
 *
 * Summarises a combine run either as console tables (rendered with the
 * tabled library) or as JSON.
 */

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::error::Result;
use crate::utils::format_file_size;

/// What ended up in a file's content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Full text content
    Text,
    /// Binary placeholder
    Binary,
    /// Inline read error
    Unreadable,
}

/// Information about a file in the report
#[derive(Debug, Clone, Serialize)]
pub struct FileReportInfo {
    /// Content kind
    pub kind: FileKind,
    /// Number of lines in the file
    pub lines: usize,
    /// Number of characters in the file
    pub chars: usize,
    /// Size read from disk
    pub bytes: u64,
}

impl FileReportInfo {
    pub fn new(kind: FileKind) -> Self {
        Self {
            kind,
            lines: 0,
            chars: 0,
            bytes: 0,
        }
    }
}

/// Statistics for a combine run
#[derive(Debug, Clone, Serialize)]
pub struct CombineReport {
    /// Where the document was written
    pub output: String,
    /// Common parent directory of the selection
    pub common_ancestor: String,
    /// Time taken
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
    /// Number of files combined
    pub files_processed: usize,
    /// Files emitted as binary placeholders
    pub binary_files: usize,
    /// Files emitted as read errors
    pub unreadable_files: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of characters
    pub total_chars: usize,
    /// Total bytes of text content
    pub total_bytes: u64,
    /// Recovered failures
    pub warnings: Vec<String>,
    /// Details for each file
    pub file_details: HashMap<String, FileReportInfo>,
}

fn serialize_duration<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Format of the report output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Console tables
    #[default]
    #[value(name = "table")]
    ConsoleTable,
    /// Pretty-printed JSON
    Json,
    /// No report
    None,
}

/// Report generator for combine results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string, empty for [`ReportFormat::None`]
    pub fn generate_report(&self, report: &CombineReport) -> Result<String> {
        match self.format {
            ReportFormat::ConsoleTable => Ok(self.generate_console_report(report)),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            ReportFormat::None => Ok(String::new()),
        }
    }

    /// Print the report to stderr so stdout stays reserved for the document
    pub fn print_report(&self, report: &CombineReport) -> Result<()> {
        let text = self.generate_report(report)?;
        if !text.is_empty() {
            eprintln!("\n{}", text);
        }
        Ok(())
    }

    // Show paths relative to the common ancestor, truncated from the left
    fn format_path(&self, path: &str, base: &str, max_len: usize) -> String {
        let rel_path = Path::new(path)
            .strip_prefix(base)
            .ok()
            .map(|p| p.to_string_lossy().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| path.to_string());

        if rel_path.chars().count() <= max_len {
            return rel_path;
        }

        // Keep the last few segments
        let mut segments = Vec::new();
        let mut current_len = 3; // Start with "..."
        for part in rel_path.split('/').rev() {
            let part_len = part.chars().count() + 1; // +1 for '/'
            if current_len + part_len <= max_len {
                segments.push(part);
                current_len += part_len;
            } else {
                break;
            }
        }

        if segments.is_empty() {
            let tail: String = rel_path
                .chars()
                .rev()
                .take(max_len.saturating_sub(3))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return format!("...{}", tail);
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    // Create a summary table using the tabled crate
    fn create_summary_table(&self, report: &CombineReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "📂 Output".to_string(),
                value: report.output.clone(),
            },
            SummaryRow {
                key: "🌳 Common Parent".to_string(),
                value: report.common_ancestor.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files Combined".to_string(),
                value: self.format_number(report.files_processed),
            },
            SummaryRow {
                key: "📝 Total Lines".to_string(),
                value: self.format_number(report.total_lines),
            },
            SummaryRow {
                key: "💾 Text Size".to_string(),
                value: format_file_size(report.total_bytes),
            },
        ];

        if report.binary_files > 0 {
            rows.push(SummaryRow {
                key: "🧱 Binary Omitted".to_string(),
                value: self.format_number(report.binary_files),
            });
        }

        if report.unreadable_files > 0 || !report.warnings.is_empty() {
            rows.push(SummaryRow {
                key: "⚠️ Problems".to_string(),
                value: format!(
                    "{} unreadable file(s), {} warning(s)",
                    report.unreadable_files,
                    report.warnings.len()
                ),
            });
        }

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Create a files table using the tabled crate
    fn create_files_table(&self, report: &CombineReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Kind")]
            kind: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Est. Tokens")]
            tokens: String,
        }

        // Largest first, path as tie breaker for stable output
        let mut files: Vec<_> = report.file_details.iter().collect();
        files.sort_by(|(pa, a), (pb, b)| b.chars.cmp(&a.chars).then_with(|| pa.cmp(pb)));

        let files_to_show = if files.len() > 15 {
            &files[0..10]
        } else {
            &files[..]
        };

        let rows: Vec<FileRow> = files_to_show
            .iter()
            .map(|(path, info)| FileRow {
                path: self.format_path(path, &report.common_ancestor, 60),
                kind: format!("{:?}", info.kind).to_lowercase(),
                lines: self.format_number(info.lines),
                tokens: self.format_number(info.chars / 4),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Generate a console table report
    fn generate_console_report(&self, report: &CombineReport) -> String {
        let summary_table = self.create_summary_table(report);
        let files_table = self.create_files_table(report);

        let summary_title = "✅  COMBINE COMPLETE";
        let files_title = if report.file_details.len() > 15 {
            "📋  TOP 10 LARGEST FILES BY CHARACTER COUNT  📋"
        } else {
            "📋  COMBINED FILES"
        };

        format!(
            "{}\n{}\n\n{}\n{}",
            files_title, files_table, summary_title, summary_table
        )
    }
}
