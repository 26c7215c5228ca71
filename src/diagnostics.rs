/*!
 * Diagnostic trace output
 *
 * Components never log ambiently; they receive a sink and write
 * human-readable trace lines to it. Nothing reads these lines back.
 */

use std::sync::{Arc, Mutex};

/// Log target used by [`LogSink`]
pub const LOG_TARGET: &str = "filecombiner";

/// Receiver for informational trace lines
pub trait DiagnosticSink: Send + Sync {
    /// Record a routine event (discovered rule files, filtering decisions)
    fn note(&self, message: &str);

    /// Record a recovered failure
    fn warn(&self, message: &str);
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn note(&self, message: &str) {
        log::debug!(target: LOG_TARGET, "{}", message);
    }

    fn warn(&self, message: &str) {
        log::warn!(target: LOG_TARGET, "{}", message);
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn note(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}
}

/// Keeps every line in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded lines
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn note(&self, message: &str) {
        self.push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.push(format!("warning: {}", message));
    }
}

/// Shared handle components hold on to
pub type SharedSink = Arc<dyn DiagnosticSink>;

/// Default sink backed by the `log` facade
pub fn log_sink() -> SharedSink {
    Arc::new(LogSink)
}
