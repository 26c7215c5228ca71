/*!
 * Command-line interface for filecombiner
 */

use std::io;
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};

use filecombiner::config::{Args, Config};
use filecombiner::diagnostics::log_sink;
use filecombiner::report::{CombineReport, Reporter};
use filecombiner::{Combiner, OutputWriter};

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "file-combiner", &mut io::stdout());
        return Ok(());
    }

    setup_logging(args.quiet, args.verbose);

    // Create configuration
    let config = Config::from_args(args);

    // Validate configuration
    config.validate()?;

    // Progress goes to stderr and only while writing to a file, so piped
    // stdout output stays clean
    let progress = if config.output_file.is_some() {
        let bar = ProgressBar::new(0);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%)")
        {
            Ok(style) => bar.set_style(style),
            Err(e) => log::warn!("Invalid progress template: {}", e),
        }
        bar.set_prefix("📊 Combining");
        bar
    } else {
        ProgressBar::hidden()
    };

    let combiner = Combiner::new(config.clone(), Arc::new(progress.clone()), log_sink());
    let writer = OutputWriter::new(config.clone());

    let start_time = Instant::now();

    let combined = combiner.combine()?;
    writer.write(&combined)?;

    let duration = start_time.elapsed();
    progress.finish_and_clear();

    for error in &combined.errors {
        log::warn!("{}", error);
    }
    if combined.is_partial() {
        eprintln!(
            "Combined {} files with {} problem(s)",
            combined.files.len(),
            combined.errors.len()
        );
    } else {
        eprintln!("Combined {} files", combined.files.len());
    }

    let stats = &combined.statistics;
    let report = CombineReport {
        output: config.output_label(),
        common_ancestor: combined.common_ancestor.display().to_string(),
        duration,
        files_processed: stats.files_processed,
        binary_files: stats.binary_files,
        unreadable_files: stats.unreadable_files,
        total_lines: stats.total_lines,
        total_chars: stats.total_chars,
        total_bytes: stats.total_bytes,
        warnings: combined.errors.iter().map(|e| e.to_string()).collect(),
        file_details: stats.file_details.clone(),
    };

    let reporter = Reporter::new(config.report_format);
    reporter.print_report(&report)?;

    Ok(())
}
