//! Test builders: ergonomic constructors for `LogEvent`s and wired-up loggers.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use kestrel::log::{Appender, MemorySink};
use kestrel::{Level, LogEvent, Logger};

// ---------------------------------------------------------------------------
// LogEventBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`LogEvent`] fixtures with fixed, deterministic
/// ambient fields.
///
/// ```rust,ignore
/// let event = LogEventBuilder::new("boom").level(Level::Error).build();
/// ```
pub struct LogEventBuilder {
    event: LogEvent,
}

impl LogEventBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            event: LogEvent {
                level: Level::Info,
                file: "src/main.rs".to_string(),
                line: 10,
                elapsed_ms: 250,
                thread_id: 4242,
                thread_name: "main".to_string(),
                fiber_id: 0,
                time: fixed_time(),
                message: message.into(),
            },
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.event.level = level;
        self
    }

    pub fn location(mut self, file: &str, line: u32) -> Self {
        self.event.file = file.to_string();
        self.event.line = line;
        self
    }

    pub fn thread(mut self, id: u64, name: &str) -> Self {
        self.event.thread_id = id;
        self.event.thread_name = name.to_string();
        self
    }

    pub fn fiber(mut self, id: u64) -> Self {
        self.event.fiber_id = id;
        self
    }

    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.event.time = time;
        self
    }

    pub fn build(self) -> LogEvent {
        self.event
    }
}

/// 2024-06-15 12:00:00 UTC. Mid-year, so the local year is 2024 everywhere.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

pub fn info_event(message: &str) -> LogEvent {
    LogEventBuilder::new(message).level(Level::Info).build()
}

pub fn error_event(message: &str) -> LogEvent {
    LogEventBuilder::new(message).level(Level::Error).build()
}

/// A detached logger writing `pattern` into a fresh [`MemorySink`].
pub fn memory_logger(name: &str, pattern: &str) -> (Arc<Logger>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let logger = Arc::new(Logger::new(name));
    assert!(logger.set_pattern(pattern), "fixture pattern must compile: {pattern}");
    logger.add_appender(Arc::new(Appender::new(sink.clone())));
    (logger, sink)
}
