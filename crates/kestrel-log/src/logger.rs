//! Loggers and the logger manager.
//!
//! A [`Logger`] filters by level and fans an event out to its appenders. A
//! logger without appenders forwards to the root logger, keeping its own
//! name for `%c`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::appender::Appender;
use crate::event::{self, LogEvent};
use crate::formatter::Formatter;
use crate::level::Level;
use crate::sink::StdoutSink;

/// Name of the logger every manager starts with.
pub const ROOT_LOGGER: &str = "root";

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

pub struct Logger {
    name: String,
    level: RwLock<Level>,
    appenders: RwLock<Vec<Arc<Appender>>>,
    formatter: RwLock<Arc<Formatter>>,
    root: Option<Arc<Logger>>,
}

impl Logger {
    /// A detached logger with no appenders and the default pattern.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_root(name, None)
    }

    fn with_root(name: impl Into<String>, root: Option<Arc<Logger>>) -> Self {
        Self {
            name: name.into(),
            level: RwLock::new(Level::Debug),
            appenders: RwLock::new(Vec::new()),
            formatter: RwLock::new(Arc::new(Formatter::default())),
            root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        *self.level.read()
    }

    pub fn set_level(&self, level: Level) {
        *self.level.write() = level;
    }

    /// Whether an event at `level` would pass this logger's filter.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    pub fn formatter(&self) -> Arc<Formatter> {
        Arc::clone(&self.formatter.read())
    }

    pub fn set_formatter(&self, formatter: Formatter) {
        *self.formatter.write() = Arc::new(formatter);
    }

    /// Compile and install `pattern`. A pattern with errors is rejected and
    /// the current formatter kept.
    pub fn set_pattern(&self, pattern: &str) -> bool {
        let formatter = Formatter::new(pattern);
        if formatter.is_error() {
            tracing::error!(logger = %self.name, pattern, "rejected malformed log pattern");
            return false;
        }
        self.set_formatter(formatter);
        true
    }

    pub fn add_appender(&self, appender: Arc<Appender>) {
        self.appenders.write().push(appender);
    }

    pub fn del_appender(&self, appender: &Arc<Appender>) {
        self.appenders.write().retain(|a| !Arc::ptr_eq(a, appender));
    }

    pub fn clear_appenders(&self) {
        self.appenders.write().clear();
    }

    pub fn appenders(&self) -> Vec<Arc<Appender>> {
        self.appenders.read().clone()
    }

    pub fn log(&self, event: &LogEvent) {
        self.log_as(&self.name, event);
    }

    fn log_as(&self, name: &str, event: &LogEvent) {
        if !self.enabled(event.level) {
            return;
        }
        let appenders = self.appenders();
        if appenders.is_empty() {
            if let Some(root) = &self.root {
                root.log_as(name, event);
            }
            return;
        }
        let formatter = self.formatter();
        for appender in appenders {
            appender.append(name, &formatter, event);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("pattern", &self.formatter().pattern())
            .field("appenders", &self.appenders.read().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Owns the root logger and every named logger.
pub struct LoggerManager {
    root: Arc<Logger>,
    loggers: RwLock<BTreeMap<String, Arc<Logger>>>,
}

static GLOBAL: OnceLock<Arc<LoggerManager>> = OnceLock::new();

impl LoggerManager {
    /// A manager whose root logger writes the default pattern to stdout.
    pub fn new() -> Self {
        event::elapsed_ms();
        let root = Arc::new(Logger::new(ROOT_LOGGER));
        root.add_appender(Arc::new(Appender::new(Arc::new(StdoutSink))));
        let mut loggers = BTreeMap::new();
        loggers.insert(ROOT_LOGGER.to_string(), Arc::clone(&root));
        Self {
            root,
            loggers: RwLock::new(loggers),
        }
    }

    /// The process-wide manager.
    pub fn global() -> &'static Arc<LoggerManager> {
        GLOBAL.get_or_init(|| Arc::new(LoggerManager::new()))
    }

    pub fn root(&self) -> Arc<Logger> {
        Arc::clone(&self.root)
    }

    /// The logger called `name`, created (forwarding to root) when absent.
    pub fn logger(&self, name: &str) -> Arc<Logger> {
        if let Some(logger) = self.loggers.read().get(name) {
            return Arc::clone(logger);
        }
        let mut loggers = self.loggers.write();
        let logger = loggers.entry(name.to_string()).or_insert_with(|| {
            Arc::new(Logger::with_root(name, Some(Arc::clone(&self.root))))
        });
        Arc::clone(logger)
    }

    /// Existing logger only.
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.loggers.read().keys().cloned().collect()
    }

    /// Put `name` back to its initial state: default pattern, level
    /// [`Level::Debug`], no appenders (the root logger gets its stdout
    /// appender back).
    pub fn reset(&self, name: &str) {
        let Some(logger) = self.get(name) else {
            return;
        };
        logger.set_level(Level::Debug);
        logger.set_formatter(Formatter::default());
        logger.clear_appenders();
        if name == ROOT_LOGGER {
            logger.add_appender(Arc::new(Appender::new(Arc::new(StdoutSink))));
        }
    }
}

impl Default for LoggerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerManager")
            .field("loggers", &self.names())
            .finish()
    }
}
