//! Log events: immutable snapshots created at the logging call site.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::level::Level;

/// One log record, rendered synchronously and then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub level: Level,
    /// Source file of the logging statement.
    pub file: String,
    pub line: u32,
    /// Milliseconds since the process first touched the log clock.
    pub elapsed_ms: u64,
    /// Synthetic per-process id from [`current_thread_id`], not the OS tid.
    pub thread_id: u64,
    pub thread_name: String,
    /// Fiber / task id; `0` when the caller does not run on one.
    pub fiber_id: u64,
    pub time: DateTime<Utc>,
    pub message: String,
}

impl LogEvent {
    /// Build an event for the calling thread at the current instant.
    pub fn capture(level: Level, file: &str, line: u32, message: impl Into<String>) -> Self {
        let thread = std::thread::current();
        Self {
            level,
            file: file.to_string(),
            line,
            elapsed_ms: elapsed_ms(),
            thread_id: current_thread_id(),
            thread_name: thread.name().unwrap_or_default().to_string(),
            fiber_id: 0,
            time: Utc::now(),
            message: message.into(),
        }
    }
}

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Small, stable numeric id of the calling thread.
///
/// Ids are handed out from a process-wide counter starting at 1, in the
/// order threads first log. They are not the OS thread id.
pub fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| *id)
}

static START: OnceLock<Instant> = OnceLock::new();

/// Milliseconds since the first call to this function in the process.
pub fn elapsed_ms() -> u64 {
    let start = START.get_or_init(Instant::now);
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_fills_ambient_fields() {
        let event = LogEvent::capture(Level::Info, "src/main.rs", 12, "hello");
        assert_eq!(event.file, "src/main.rs");
        assert_eq!(event.line, 12);
        assert_eq!(event.message, "hello");
        assert_eq!(event.thread_id, current_thread_id());
        assert_eq!(event.fiber_id, 0);
    }

    #[test]
    fn thread_ids_differ_between_threads() {
        let here = current_thread_id();
        let there = std::thread::spawn(current_thread_id).join().unwrap();
        assert_ne!(here, there);
        assert_eq!(here, current_thread_id());
        assert!(here >= 1 && there >= 1);
        assert!(NEXT_THREAD_ID.load(Ordering::Relaxed) > here.max(there));
    }

    #[test]
    fn named_threads_report_their_name() {
        let name = std::thread::Builder::new()
            .name("worker-1".into())
            .spawn(|| LogEvent::capture(Level::Debug, "f", 1, "").thread_name)
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(name, "worker-1");
    }
}
