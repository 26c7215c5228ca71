/*!
 * Output artifact writer
 */

use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::combiner::Combined;
use crate::config::Config;
use crate::error::{CombinerError, Result};

/// Writes the combined document to a file or stdout
pub struct OutputWriter {
    /// Writer configuration
    config: Config,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Write the full document.
    ///
    /// This is the only step whose failure ends the run.
    pub fn write(&self, combined: &Combined) -> Result<()> {
        let document = combined.document();
        let written = match &self.config.output_file {
            Some(path) => File::create(path).and_then(|file| write_all(BufWriter::new(file), &document)),
            None => write_all(io::stdout().lock(), &document),
        };

        written.map_err(|e| {
            CombinerError::Output(format!(
                "failed to write combined document to {}: {}",
                self.config.output_label(),
                e
            ))
        })
    }
}

fn write_all<W: Write>(mut writer: W, document: &str) -> io::Result<()> {
    writer.write_all(document.as_bytes())?;
    writer.flush()
}
