//! Error logs: where failed delta checks are dumped.
//!
//! A log is write-only from the engine's point of view. The caller creates
//! it, hands a clone to observers or deltas, and keeps ownership of the
//! underlying sink; the engine never closes it.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::report::MismatchReport;

/// Output format of a [`WriterSink`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable REMOVED / ADDED sections.
    #[default]
    Text,
    /// One JSON object per report, newline-delimited.
    Json,
}

/// Destination for mismatch reports.
pub trait LogSink: Send {
    /// Record one failed check.
    fn record(&mut self, report: &MismatchReport) -> io::Result<()>;
}

/// A sink that formats reports onto any writer.
pub struct WriterSink<W> {
    writer: W,
    format: LogFormat,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W, format: LogFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn record(&mut self, report: &MismatchReport) -> io::Result<()> {
        match self.format {
            LogFormat::Text => write!(self.writer, "{report}")?,
            LogFormat::Json => {
                serde_json::to_writer(&mut self.writer, &report.to_json())?;
                writeln!(self.writer)?;
            }
        }
        self.writer.flush()
    }
}

/// A sink that keeps reports in memory for later inspection.
///
/// Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    reports: Arc<Mutex<Vec<MismatchReport>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports recorded so far, oldest first.
    pub fn reports(&self) -> Vec<MismatchReport> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn record(&mut self, report: &MismatchReport) -> io::Result<()> {
        self.reports
            .lock()
            .map_err(|_| io::Error::other("memory sink lock poisoned"))?
            .push(report.clone());
        Ok(())
    }
}

/// Shared handle to a log sink.
///
/// Cheap to clone; every clone writes to the same sink.
#[derive(Clone)]
pub struct ErrorLog {
    sink: Arc<Mutex<dyn LogSink>>,
}

impl ErrorLog {
    /// Wrap any sink.
    pub fn new(sink: impl LogSink + 'static) -> Self {
        let sink: Arc<Mutex<dyn LogSink>> = Arc::new(Mutex::new(sink));
        Self { sink }
    }

    /// Log to standard error.
    pub fn stderr(format: LogFormat) -> Self {
        Self::new(WriterSink::new(io::stderr(), format))
    }

    /// Log to standard output.
    pub fn stdout(format: LogFormat) -> Self {
        Self::new(WriterSink::new(io::stdout(), format))
    }

    /// Log to a newly created (truncated) file.
    pub fn file(path: impl AsRef<Path>, format: LogFormat) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(WriterSink::new(BufWriter::new(file), format)))
    }

    /// Log into memory; the returned sink reads back what was recorded.
    pub fn memory() -> (Self, MemorySink) {
        let sink = MemorySink::new();
        (Self::new(sink.clone()), sink)
    }

    /// Record one report.
    pub fn record(&self, report: &MismatchReport) -> io::Result<()> {
        self.sink
            .lock()
            .map_err(|_| io::Error::other("error log lock poisoned"))?
            .record(report)
    }
}

impl std::fmt::Debug for ErrorLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorLog").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MismatchGroup;
    use rowdelta_types::row;

    fn report() -> MismatchReport {
        MismatchReport {
            columns: vec![],
            removed: MismatchGroup {
                unclaimed: vec![row!["a", 1]],
                unsatisfied: vec![],
            },
            added: MismatchGroup::default(),
        }
    }

    #[test]
    fn text_sink_writes_sections() {
        let mut sink = WriterSink::new(Vec::new(), LogFormat::Text);
        sink.record(&report()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.contains("REMOVED"));
        assert!(out.contains("ADDED"));
        assert!(out.contains("[\"a\", 1]"));
    }

    #[test]
    fn json_sink_writes_one_line_per_report() {
        let mut sink = WriterSink::new(Vec::new(), LogFormat::Json);
        sink.record(&report()).unwrap();
        sink.record(&report()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["removed"]["unclaimed"], serde_json::json!([["a", 1]]));
    }

    #[test]
    fn memory_log_is_shared_across_clones() {
        let (log, sink) = ErrorLog::memory();
        let other = log.clone();
        log.record(&report()).unwrap();
        other.record(&report()).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.reports()[0], report());
    }

    #[test]
    fn file_log_persists_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.log");
        let log = ErrorLog::file(&path, LogFormat::Text).unwrap();
        log.record(&report()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("delta assertion failed"));
    }

    #[test]
    fn format_deserializes_from_snake_case() {
        let f: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(f, LogFormat::Json);
    }
}
