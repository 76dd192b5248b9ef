//! Sinks: where rendered log text ends up.
//!
//! Every sink serialises its own writes, so two appenders sharing a sink
//! never interleave partial lines.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::LogError;

/// Destination for rendered log text.
pub trait Sink: Send + Sync {
    fn write_str(&self, text: &str) -> Result<(), LogError>;

    /// Re-acquire the underlying resource. Returns `true` on success.
    fn reopen(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Stdout
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn write_str(&self, text: &str) -> Result<(), LogError> {
        let mut out = std::io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// Appends to a flat file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileSink {
    /// Open `path` for appending, creating it when missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref().to_path_buf();
        let file = open_append(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(Some(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_append(path: &Path) -> Result<File, LogError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}

impl Sink for FileSink {
    fn write_str(&self, text: &str) -> Result<(), LogError> {
        let mut guard = self.file.lock();
        let file = guard
            .as_mut()
            .ok_or_else(|| LogError::FileClosed(self.path.clone()))?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }

    fn reopen(&self) -> bool {
        let mut guard = self.file.lock();
        *guard = None;
        match open_append(&self.path) {
            Ok(file) => {
                *guard = Some(file);
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "log file reopen failed");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Collects text in memory; handy for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    buf: Mutex<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.buf.lock().clone()
    }

    /// Drain and return everything written so far.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buf.lock())
    }
}

impl Sink for MemorySink {
    fn write_str(&self, text: &str) -> Result<(), LogError> {
        self.buf.lock().push_str(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_appends_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let sink = FileSink::open(&path).unwrap();
        sink.write_str("one\n").unwrap();
        assert!(sink.reopen());
        sink.write_str("two\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn file_sink_open_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSink::open(dir.path().join("missing").join("app.log")).unwrap_err();
        assert!(matches!(err, LogError::OpenFile { .. }));
    }

    #[test]
    fn reopen_failure_returns_false_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("logs");
        std::fs::create_dir(&sub).unwrap();
        let sink = FileSink::open(sub.join("app.log")).unwrap();
        std::fs::remove_dir_all(&sub).unwrap();

        assert!(!sink.reopen());
        assert!(matches!(sink.write_str("x"), Err(LogError::FileClosed(_))));
    }

    #[test]
    fn memory_sink_take_drains() {
        let sink = MemorySink::new();
        sink.write_str("a").unwrap();
        sink.write_str("b").unwrap();
        assert_eq!(sink.take(), "ab");
        assert_eq!(sink.contents(), "");
    }
}
