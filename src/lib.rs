//! kestrel: typed configuration registry and pattern-driven logging.
//!
//! This crate re-exports the two workspace libraries so binaries and
//! integration tests can depend on one name.
//!
//! # Architecture
//!
//! ```text
//! config document ──► Registry ──► ConfigVar<T> ──► listeners
//!                                        │
//!                         "logs" ConfigVar<BTreeSet<LoggerDefinition>>
//!                                        │
//!                                        ▼
//!                  LoggerManager ──► Logger ──► Appender ──► Sink
//! ```
//!
//! Everything runs synchronously on the caller's thread.

pub use kestrel_config as config;
pub use kestrel_log as log;

pub use kestrel_config::{ConfigValue, ConfigVar, ConfigVarBase, DocumentFormat, Registry};
pub use kestrel_log::{
    install_log_binding, Formatter, Level, LogEvent, Logger, LoggerDefinition, LoggerManager,
};
