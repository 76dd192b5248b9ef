//! Call-site logging macros.
//!
//! ```rust,ignore
//! let logger = LoggerManager::global().logger("system");
//! log_info!(logger, "listening on {}", port);
//! ```
//!
//! The message is only formatted when the logger's level lets it through.

#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        let level: $crate::Level = $level;
        if logger.enabled(level) {
            logger.log(&$crate::LogEvent::capture(level, file!(), line!(), format!($($arg)+)));
        }
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::Error, $($arg)+) };
}

#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)+) => { $crate::log_at!($logger, $crate::Level::Fatal, $($arg)+) };
}
