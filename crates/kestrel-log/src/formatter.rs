//! Event renderer: applies a compiled pattern to a [`LogEvent`].

use std::fmt::{self, Write};

use chrono::Local;

use crate::event::LogEvent;
use crate::pattern::{self, CompiledPattern, Directive, DEFAULT_PATTERN};

/// A compiled pattern ready to render events. Stateless once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    pattern: String,
    compiled: CompiledPattern,
}

impl Formatter {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            compiled: pattern::compile(pattern),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// `true` when the pattern had malformed directives. The formatter still
    /// renders, with inline error markers.
    pub fn is_error(&self) -> bool {
        self.compiled.has_error
    }

    pub fn directives(&self) -> &[Directive] {
        &self.compiled.directives
    }

    /// Render `event` as logged by `logger_name`.
    pub fn format(&self, logger_name: &str, event: &LogEvent) -> String {
        let mut out = String::with_capacity(event.message.len() + 64);
        if let Err(err) = self.format_into(&mut out, logger_name, event) {
            tracing::error!(pattern = %self.pattern, error = %err, "log pattern failed to render");
        }
        out
    }

    pub fn format_into<W: Write>(
        &self,
        out: &mut W,
        logger_name: &str,
        event: &LogEvent,
    ) -> fmt::Result {
        for directive in &self.compiled.directives {
            match directive {
                Directive::Literal(text) => out.write_str(text)?,
                Directive::Message => out.write_str(&event.message)?,
                Directive::Level => out.write_str(event.level.as_str())?,
                Directive::Elapsed => write!(out, "{}", event.elapsed_ms)?,
                Directive::LoggerName => out.write_str(logger_name)?,
                Directive::ThreadId => write!(out, "{}", event.thread_id)?,
                Directive::ThreadName => out.write_str(&event.thread_name)?,
                Directive::FiberId => write!(out, "{}", event.fiber_id)?,
                Directive::NewLine => out.write_char('\n')?,
                Directive::DateTime(template) => {
                    write!(out, "{}", event.time.with_timezone(&Local).format(template))?
                }
                Directive::FileName => out.write_str(&event.file)?,
                Directive::Line => write!(out, "{}", event.line)?,
                Directive::Tab => out.write_char('\t')?,
            }
        }
        Ok(())
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN)
    }
}
