//! Appenders: a sink with its own level filter and optional formatter.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::LogEvent;
use crate::formatter::Formatter;
use crate::level::Level;
use crate::sink::Sink;

pub struct Appender {
    sink: Arc<dyn Sink>,
    level: RwLock<Level>,
    formatter: RwLock<Option<Arc<Formatter>>>,
}

impl Appender {
    /// Appender passing everything at [`Level::Debug`] and above, rendering
    /// with its logger's formatter.
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self {
            sink,
            level: RwLock::new(Level::Debug),
            formatter: RwLock::new(None),
        }
    }

    pub fn with_level(self, level: Level) -> Self {
        self.set_level(level);
        self
    }

    pub fn with_formatter(self, formatter: Formatter) -> Self {
        self.set_formatter(Some(formatter));
        self
    }

    pub fn level(&self) -> Level {
        *self.level.read()
    }

    pub fn set_level(&self, level: Level) {
        *self.level.write() = level;
    }

    /// Own formatter, if one overrides the logger's.
    pub fn formatter(&self) -> Option<Arc<Formatter>> {
        self.formatter.read().clone()
    }

    pub fn set_formatter(&self, formatter: Option<Formatter>) {
        *self.formatter.write() = formatter.map(Arc::new);
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    /// Render and write `event` unless it is below this appender's level.
    pub fn append(&self, logger_name: &str, fallback: &Formatter, event: &LogEvent) {
        if event.level < self.level() {
            return;
        }
        let own = self.formatter();
        let formatter = own.as_deref().unwrap_or(fallback);
        let text = formatter.format(logger_name, event);
        if let Err(err) = self.sink.write_str(&text) {
            tracing::error!(logger = %logger_name, error = %err, "log sink write failed");
        }
    }
}

impl fmt::Debug for Appender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Appender")
            .field("level", &self.level())
            .field("pattern", &self.formatter().map(|fm| fm.pattern().to_string()))
            .finish_non_exhaustive()
    }
}
