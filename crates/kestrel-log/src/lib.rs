//! kestrel-log: pattern-compiled log formatting.
//!
//! # Architecture
//!
//! ```text
//! log_info!(..) ──► LogEvent ──► Logger ──► Appender ──► Formatter ──► Sink
//!                                  │  level     │  level
//!                                  └─► root (when the logger has no appenders)
//! ```
//!
//! [`pattern::compile`] turns a pattern string into [`Directive`]s once; the
//! [`Formatter`] replays them per event. Loggers can be driven from a
//! `kestrel-config` registry through [`binding::install_log_binding`].

pub mod appender;
pub mod binding;
pub mod error;
pub mod event;
pub mod formatter;
pub mod level;
pub mod logger;
mod macros;
pub mod pattern;
pub mod sink;

pub use appender::Appender;
pub use binding::{install_log_binding, AppenderDefinition, AppenderKind, LoggerDefinition};
pub use error::LogError;
pub use event::LogEvent;
pub use formatter::Formatter;
pub use level::Level;
pub use logger::{Logger, LoggerManager, ROOT_LOGGER};
pub use pattern::{CompiledPattern, Directive, DEFAULT_PATTERN};
pub use sink::{FileSink, MemorySink, Sink, StdoutSink};
