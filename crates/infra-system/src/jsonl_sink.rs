// JSON Lines log sink
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

use envprobe_core::domain::LogRecord;
use envprobe_core::port::LogSink;
use envprobe_core::SinkError;

/// Appends one JSON object per line to a file
///
/// The file is created on first write; parent directories never are.
/// Appends from this process are serialized; other processes writing the
/// same file need their own locking.
pub struct JsonlLogSink {
    path: PathBuf,
    write_lock: Mutex<()>,
    /// Where append failures are reported (stderr unless overridden)
    diagnostics: Mutex<Box<dyn Write + Send>>,
}

impl JsonlLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_diagnostics(path, Box::new(io::stderr()))
    }

    /// Report append failures to `diagnostics` instead of stderr
    pub fn with_diagnostics(path: impl Into<PathBuf>, diagnostics: Box<dyn Write + Send>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            diagnostics: Mutex::new(diagnostics),
        }
    }

    /// Append one record, surfacing the failure
    pub fn try_append(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let io_error = |source| SinkError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_error)?;

        // Single write so a record never interleaves with another one
        file.write_all(&line).map_err(io_error)?;
        Ok(())
    }

    fn report(&self, err: &SinkError) {
        let mut out = self
            .diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Nowhere left to report to if this fails too
        let _ = writeln!(out, "envprobe: cannot write log: {}", err);
        let _ = out.flush();
    }
}

impl LogSink for JsonlLogSink {
    fn append(&self, record: &LogRecord) {
        if let Err(e) = self.try_append(record) {
            warn!(
                path = %self.path.display(),
                hypothesis_id = %record.hypothesis_id,
                error = %e,
                "Failed to append diagnostic record"
            );
            self.report(&e);
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
