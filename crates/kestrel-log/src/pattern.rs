//! Pattern compiler: turns `%d{%H:%M}%T[%p]%T%m%n` into [`Directive`]s.
//!
//! # Directives
//!
//! | Letter | Renders                                   |
//! |--------|-------------------------------------------|
//! | `m`    | message                                   |
//! | `p`    | level                                     |
//! | `r`    | elapsed milliseconds                      |
//! | `c`    | logger name                               |
//! | `t`    | thread id (per-process counter, not OS)   |
//! | `N`    | thread name                               |
//! | `F`    | fiber id                                  |
//! | `n`    | newline                                   |
//! | `d`    | timestamp, `{...}` is a strftime template |
//! | `f`    | file name                                 |
//! | `l`    | line number                               |
//! | `T`    | tab                                       |
//! | `%%`   | a literal `%`                             |
//!
//! Compilation never fails. Unknown letters become the literal
//! `<<error_format %X>>`; an unterminated `{` becomes `<<pattern_error>>` and
//! ends the scan. Either way [`CompiledPattern::has_error`] is set.

use chrono::format::{Item, StrftimeItems};

/// Pattern used when none is configured.
pub const DEFAULT_PATTERN: &str = "%d{%Y-%m-%d %H:%M:%S}%T%t%T%N%T%F%T[%p]%T[%c]%T%f:%l%T%m%n";

/// Timestamp template used by an empty `%d`.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One compiled unit of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Literal(String),
    Message,
    Level,
    Elapsed,
    LoggerName,
    ThreadId,
    ThreadName,
    FiberId,
    NewLine,
    /// Wall-clock time rendered with a validated strftime template.
    DateTime(String),
    FileName,
    Line,
    Tab,
}

/// Directives in source order plus an overall error flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompiledPattern {
    pub directives: Vec<Directive>,
    pub has_error: bool,
}

/// Compile `pattern` in a single left-to-right pass.
pub fn compile(pattern: &str) -> CompiledPattern {
    let mut out = CompiledPattern::default();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }

        let Some(letter) = chars.next() else {
            flush(&mut literal, &mut out.directives);
            out.directives.push(Directive::Literal("<<error_format %>>".to_string()));
            out.has_error = true;
            break;
        };
        if letter == '%' {
            literal.push('%');
            continue;
        }

        let mut arg = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                arg.push(c);
            }
            if !closed {
                tracing::warn!(pattern, "unterminated directive argument in log pattern");
                flush(&mut literal, &mut out.directives);
                out.directives.push(Directive::Literal("<<pattern_error>>".to_string()));
                out.has_error = true;
                break;
            }
        }

        flush(&mut literal, &mut out.directives);
        match resolve(letter, arg) {
            Ok(directive) => out.directives.push(directive),
            Err(directive) => {
                tracing::warn!(pattern, directive = %letter, "bad directive in log pattern");
                out.directives.push(directive);
                out.has_error = true;
            }
        }
    }

    flush(&mut literal, &mut out.directives);
    out
}

fn flush(literal: &mut String, directives: &mut Vec<Directive>) {
    if !literal.is_empty() {
        directives.push(Directive::Literal(std::mem::take(literal)));
    }
}

/// Map a directive letter to its renderer. `Err` carries the substitute
/// directive for a letter or argument that cannot be honoured.
fn resolve(letter: char, arg: String) -> Result<Directive, Directive> {
    let directive = match letter {
        'm' => Directive::Message,
        'p' => Directive::Level,
        'r' => Directive::Elapsed,
        'c' => Directive::LoggerName,
        't' => Directive::ThreadId,
        'N' => Directive::ThreadName,
        'F' => Directive::FiberId,
        'n' => Directive::NewLine,
        'f' => Directive::FileName,
        'l' => Directive::Line,
        'T' => Directive::Tab,
        'd' if arg.is_empty() => Directive::DateTime(DEFAULT_TIME_FORMAT.to_string()),
        'd' if is_valid_time_format(&arg) => Directive::DateTime(arg),
        'd' => return Err(Directive::DateTime(DEFAULT_TIME_FORMAT.to_string())),
        other => return Err(Directive::Literal(format!("<<error_format %{other}>>"))),
    };
    Ok(directive)
}

fn is_valid_time_format(template: &str) -> bool {
    StrftimeItems::new(template).all(|item| !matches!(item, Item::Error))
}
