//! Config-driven logger setup.
//!
//! [`install_log_binding`] registers the `logs` variable (a set of
//! [`LoggerDefinition`]s) and a listener that rebuilds loggers whenever the
//! set changes. A YAML document for it looks like:
//!
//! ```yaml
//! logs:
//!   - name: system
//!     level: info
//!     formatter: "%d%T[%p]%T%m%n"
//!     appenders:
//!       - type: file
//!         file: /var/log/system.log
//!       - type: stdout
//!         level: error
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use kestrel_config::{
    serde_from_node, serde_to_node, CodecError, ConfigValue, ConfigVar, Node, Registry,
    RegistryError,
};
use serde::{Deserialize, Serialize};

use crate::appender::Appender;
use crate::formatter::Formatter;
use crate::level::Level;
use crate::logger::LoggerManager;
use crate::sink::{FileSink, Sink, StdoutSink};

/// Registry name of the logger-definition set.
pub const LOGS_VAR: &str = "logs";

/// Listener id the binding registers on [`LOGS_VAR`].
pub const LOG_BINDING_LISTENER: u64 = 0x4C4F_4753;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppenderKind {
    Stdout,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppenderDefinition {
    #[serde(rename = "type")]
    pub kind: AppenderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
}

/// Desired state of one named logger.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoggerDefinition {
    pub name: String,
    #[serde(default)]
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
    #[serde(default)]
    pub appenders: Vec<AppenderDefinition>,
}

impl ConfigValue for LoggerDefinition {
    fn type_name() -> &'static str {
        "LoggerDefinition"
    }

    fn to_node(&self) -> Result<Node, CodecError> {
        serde_to_node(self)
    }

    fn from_node(node: &Node) -> Result<Self, CodecError> {
        let def: LoggerDefinition = serde_from_node(node)?;
        if def.name.trim().is_empty() {
            return Err(invalid(node, "logger name is empty"));
        }
        if let Some(bad) = def
            .appenders
            .iter()
            .find(|a| a.kind == AppenderKind::File && a.file.is_none())
        {
            return Err(invalid(node, format!("file appender {bad:?} has no file")));
        }
        Ok(def)
    }
}

fn invalid(node: &Node, reason: impl Into<String>) -> CodecError {
    CodecError::Decode {
        type_name: LoggerDefinition::type_name(),
        input: node.to_string(),
        reason: reason.into(),
    }
}

/// Register [`LOGS_VAR`] in `registry` and keep `manager` in step with it.
///
/// The listener holds only a weak reference to `manager`.
pub fn install_log_binding(
    registry: &Registry,
    manager: &Arc<LoggerManager>,
) -> Result<Arc<ConfigVar<BTreeSet<LoggerDefinition>>>, RegistryError> {
    let var = registry.lookup_or_create::<BTreeSet<LoggerDefinition>>(
        LOGS_VAR,
        BTreeSet::new(),
        "logger definitions",
    )?;
    let manager: Weak<LoggerManager> = Arc::downgrade(manager);
    var.add_listener(LOG_BINDING_LISTENER, move |old, new| {
        if let Some(manager) = manager.upgrade() {
            apply_definitions(&manager, old, new);
        }
    });
    Ok(var)
}

/// Move `manager` from the `old` definition set to `new`.
pub fn apply_definitions(
    manager: &LoggerManager,
    old: &BTreeSet<LoggerDefinition>,
    new: &BTreeSet<LoggerDefinition>,
) {
    for def in new.difference(old) {
        configure(manager, def);
    }

    let kept: BTreeSet<&str> = new.iter().map(|d| d.name.as_str()).collect();
    for def in old {
        if !kept.contains(def.name.as_str()) {
            tracing::info!(logger = %def.name, "logger definition removed");
            manager.reset(&def.name);
        }
    }
}

fn configure(manager: &LoggerManager, def: &LoggerDefinition) {
    let logger = manager.logger(&def.name);
    logger.set_level(def.level);
    match &def.formatter {
        Some(pattern) => {
            logger.set_pattern(pattern);
        }
        None => logger.set_formatter(Formatter::default()),
    }

    logger.clear_appenders();
    for appender_def in &def.appenders {
        let Some(appender) = build_appender(&def.name, appender_def) else {
            continue;
        };
        logger.add_appender(Arc::new(appender));
    }
    tracing::info!(logger = %def.name, level = %def.level, appenders = def.appenders.len(), "logger configured");
}

fn build_appender(logger: &str, def: &AppenderDefinition) -> Option<Appender> {
    let sink: Arc<dyn Sink> = match (def.kind, &def.file) {
        (AppenderKind::Stdout, _) => Arc::new(StdoutSink),
        (AppenderKind::File, Some(path)) => match FileSink::open(path) {
            Ok(sink) => Arc::new(sink),
            Err(err) => {
                tracing::error!(logger, error = %err, "file appender skipped");
                return None;
            }
        },
        (AppenderKind::File, None) => {
            tracing::error!(logger, "file appender without a file skipped");
            return None;
        }
    };

    let appender = Appender::new(sink).with_level(def.level);
    if let Some(pattern) = &def.formatter {
        let formatter = Formatter::new(pattern);
        if formatter.is_error() {
            tracing::error!(logger, pattern = %pattern, "appender pattern rejected, using logger's");
        } else {
            appender.set_formatter(Some(formatter));
        }
    }
    Some(appender)
}
